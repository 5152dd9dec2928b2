use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use paper_collector::config::{get_config, load_config};
use paper_collector::models::{AuthorQuery, Paper};
use paper_collector::PaperCollector;
use tracing_subscriber::EnvFilter;

/// Paper Collector - Aggregate a researcher's publications from multiple scholarly sources
#[derive(Parser, Debug)]
#[command(name = "paper-collector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Collect and deduplicate a researcher's publications", long_about = None)]
struct Cli {
    /// Author name to search for
    name: String,

    /// Restrict results to authors affiliated with this institution
    #[arg(long, short)]
    school: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format (machine-readable)
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "paper_collector=info",
        1 => "paper_collector=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => get_config(),
    };

    let mut query = AuthorQuery::new(&cli.name);
    if let Some(school) = &cli.school {
        query = query.school(school);
    }

    let collector = PaperCollector::with_config(&config);
    let papers = collector.get_papers(&query).await;

    match cli.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&papers)?),
        OutputFormat::Text => print_papers(&papers),
    }

    Ok(())
}

fn print_papers(papers: &[Paper]) {
    if papers.is_empty() {
        println!("No papers found.");
        return;
    }

    println!("Found {} paper(s)\n", papers.len());

    for (i, paper) in papers.iter().enumerate() {
        println!("{}. {}", i + 1, paper.title);

        let authors: Vec<&str> = paper.authors.iter().map(|a| a.name.as_str()).collect();
        if !authors.is_empty() {
            println!("   Authors: {}", authors.join(", "));
        }
        if !paper.journal.is_empty() {
            println!("   Journal: {}", paper.journal);
        }
        if !paper.publication_date.is_empty() {
            println!("   Date: {}", paper.publication_date);
        }
        if !paper.categories.is_empty() {
            println!("   Categories: {}", paper.categories.join(", "));
        }
        for (kind, value) in paper.links.iter() {
            println!("   {}: {}", kind, value);
        }
        println!();
    }
}

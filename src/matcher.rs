//! Author name matching across the format conventions of different sources.
//!
//! Every source encodes author names differently: arXiv and PubMed report
//! "First Last", Zenodo frequently uses "Last, First", and Crossref mixes
//! full names, comma forms and initials. Each adapter picks the matcher
//! variant tuned to its source's conventions.
//!
//! The substring matchers are deliberately loose and will conflate distinct
//! people who share a name substring; the Crossref matcher is deliberately
//! strict and will miss reformatted names. Both failure modes are accepted —
//! none of the sources reliably expose ORCID or institutional identifiers,
//! so heuristic string matching is the best available signal.

/// Decides whether a candidate author-name string plausibly denotes the
/// target author.
pub trait AuthorMatcher: Send + Sync + std::fmt::Debug {
    /// Whether `candidate` plausibly refers to `target`
    fn matches(&self, candidate: &str, target: &str) -> bool;
}

/// Loose case-folded substring containment (arXiv, PubMed, DOAJ).
///
/// Matches when the target name appears anywhere inside the candidate name.
/// "Jane Doe" matches "Jane Doe Smith" and "Dr. Jane Doe" alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl AuthorMatcher for SubstringMatcher {
    fn matches(&self, candidate: &str, target: &str) -> bool {
        candidate.to_lowercase().contains(&target.to_lowercase())
    }
}

/// Substring containment with extra handling for Zenodo's "Last, First"
/// creator format.
///
/// Besides plain containment, a multi-token target also matches when the
/// candidate has a comma and the target's last token appears in the
/// candidate's pre-comma segment ("Doe, Jane" for target "Jane Doe").
#[derive(Debug, Clone, Copy, Default)]
pub struct ZenodoCreatorMatcher;

impl AuthorMatcher for ZenodoCreatorMatcher {
    fn matches(&self, candidate: &str, target: &str) -> bool {
        let candidate_lower = candidate.to_lowercase();
        let target_lower = target.to_lowercase();

        if candidate_lower.contains(&target_lower) {
            return true;
        }

        let parts: Vec<&str> = target_lower.split_whitespace().collect();
        if parts.len() >= 2 {
            if let Some((pre_comma, _)) = candidate_lower.split_once(',') {
                let last_name = parts[parts.len() - 1];
                if pre_comma.contains(last_name) {
                    return true;
                }
            }
        }

        false
    }
}

/// Strict multi-stage matcher for Crossref's mixed name formats.
///
/// Stages are tried in order, exact first then degrading:
///
/// 1. exact case-folded equality
/// 2. "Last, First" reversed to "First Last", exact equality
/// 3. two tokens on both sides, equal as an order-independent set
/// 4. initialed form ("J. Doe"): first token is an initial matching the
///    target's first token, second token equals the target's last token
/// 5. fallback two-token order-independent set comparison
///
/// Unlike the substring matchers this never accepts partial containment, so
/// "Jane Doe" does not match "Jane Doeworth".
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossrefStagedMatcher;

impl AuthorMatcher for CrossrefStagedMatcher {
    fn matches(&self, candidate: &str, target: &str) -> bool {
        let candidate = candidate.to_lowercase().trim().to_string();
        let target = target.to_lowercase().trim().to_string();

        // Stage 1: exact match
        if candidate == target {
            return true;
        }

        let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
        let target_tokens: Vec<&str> = target.split_whitespace().collect();

        // Stage 2: "Last, First" reversed must equal the target exactly
        if candidate.contains(',') {
            let comma_parts: Vec<&str> = candidate.splitn(2, ',').collect();
            if comma_parts.len() == 2 {
                let last = comma_parts[0].trim();
                let first = comma_parts[1].trim();
                let reversed = format!("{} {}", first, last);
                if target == reversed {
                    return true;
                }
            }
        }

        // Stages 3 and 5: two tokens each, order-independent
        if candidate_tokens.len() == 2
            && target_tokens.len() == 2
            && tokens_match_either_order(&candidate_tokens, &target_tokens)
        {
            return true;
        }

        // Stage 4: initialed form, e.g. candidate "j. doe" for target "jane doe"
        if candidate.contains('.') && target_tokens.len() >= 2 && candidate_tokens.len() == 2 {
            let initial = candidate_tokens[0];
            let surname = candidate_tokens[1];
            if initial.ends_with('.')
                && initial.chars().next() == target_tokens[0].chars().next()
                && surname == target_tokens[target_tokens.len() - 1]
            {
                return true;
            }
        }

        false
    }
}

fn tokens_match_either_order(a: &[&str], b: &[&str]) -> bool {
    (a[0] == b[0] && a[1] == b[1]) || (a[0] == b[1] && a[1] == b[0])
}

/// Case-folded substring test of the target institution inside an author's
/// affiliation text (DOAJ, Zenodo, Crossref).
pub fn affiliation_matches(school: &str, affiliation: &str) -> bool {
    affiliation.to_lowercase().contains(&school.to_lowercase())
}

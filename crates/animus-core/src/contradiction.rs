//! Location-claim extraction and contradiction checks.
//!
//! This is a heuristic, not a proof: it only looks at "was at X" / "was in X"
//! style statements and their negations, and only flags opposite polarity for
//! the same place.

/// A single location claim parsed out of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationClaim {
    pub place: String,
    pub negated: bool,
}

const NEGATED_MARKERS: [&str; 4] = ["was not at ", "was not in ", "wasn't at ", "wasn't in "];
const POSITIVE_MARKERS: [&str; 2] = ["was at ", "was in "];

/// Extract every location claim from `text`, case-insensitive. The place is
/// the token immediately following the marker, stripped of punctuation.
pub fn extract_claims(text: &str) -> Vec<LocationClaim> {
    let lower = text.to_lowercase();
    let mut claims = Vec::new();

    for marker in NEGATED_MARKERS {
        collect(&lower, marker, true, &mut claims);
    }
    for marker in POSITIVE_MARKERS {
        collect(&lower, marker, false, &mut claims);
    }

    // The positive markers never match inside a negated phrase ("was not at"
    // has no "was at " substring), so only identical repeats need removing.
    claims.dedup();
    claims
}

fn collect(lower: &str, marker: &str, negated: bool, claims: &mut Vec<LocationClaim>) {
    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find(marker) {
        let start = search_from + pos + marker.len();
        let place: String = lower[start..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if !place.is_empty() {
            claims.push(LocationClaim { place, negated });
        }
        search_from = start;
    }
}

/// True if any prior claim and any candidate claim name the same place with
/// opposite polarity.
pub fn contradicts(prior: &[LocationClaim], candidate: &[LocationClaim]) -> bool {
    prior.iter().any(|p| {
        candidate
            .iter()
            .any(|c| c.place == p.place && c.negated != p.negated)
    })
}

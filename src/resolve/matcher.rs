//! Candidate generation for one fragment against one gazetteer tier.

use crate::gazetteer::GazetteerIndex;
use crate::models::{PlaceRecord, Tier};

use super::segment::AddressFragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Exact,
    Fuzzy,
}

/// A scored match between a fragment and a gazetteer record. Ephemeral:
/// borrows the shared index and the request's fragment, consumed by the
/// resolver.
#[derive(Debug, Clone)]
pub struct MatchCandidate<'g, 'f> {
    pub place: &'g PlaceRecord,
    pub fragment: &'f AddressFragment,
    pub score: f64,
    pub method: MatchMethod,
}

impl MatchCandidate<'_, '_> {
    /// Whether this candidate clears an acceptance threshold. Exact
    /// matches are always accepted.
    pub fn accepted(&self, threshold: f64) -> bool {
        self.method == MatchMethod::Exact || self.score >= threshold
    }
}

/// Match one fragment against one tier, descending by score.
///
/// Exact hits score 1.0 and short-circuit the fuzzy lookup for this
/// (fragment, tier) pair; otherwise fuzzy candidates carry their
/// similarity as the score. The same fragment may be matched against
/// both tiers when its role is ambiguous.
pub fn match_fragment<'g, 'f>(
    index: &'g GazetteerIndex,
    fragment: &'f AddressFragment,
    tier: Tier,
    max_candidates: usize,
    floor: f64,
) -> Vec<MatchCandidate<'g, 'f>> {
    let text = fragment.text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let exact = index.lookup_exact(text, tier);
    if !exact.is_empty() {
        return exact
            .into_iter()
            .map(|place| MatchCandidate {
                place,
                fragment,
                score: 1.0,
                method: MatchMethod::Exact,
            })
            .collect();
    }

    index
        .lookup_fuzzy(text, tier, max_candidates, floor)
        .into_iter()
        .map(|(place, similarity)| MatchCandidate {
            place,
            fragment,
            score: similarity,
            method: MatchMethod::Fuzzy,
        })
        .collect()
}

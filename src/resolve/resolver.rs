//! Tier acceptance state machine.
//!
//! Resolution walks strictly finest to coarsest: a townland acceptance
//! is ideal, a county acceptance is the floor, and no match is an
//! honest failure rather than a guess. Transitions never retry upward.

use tracing::debug;

use crate::gazetteer::{GazetteerIndex, DEFAULT_FUZZY_FLOOR, DEFAULT_MAX_CANDIDATES};
use crate::models::{GeocodeResult, Tier};

use super::matcher::{match_fragment, MatchCandidate};
use super::segment::{AddressFragment, FragmentRole};

/// Acceptance tuning for one resolver pass.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Minimum fuzzy score to accept a townland candidate.
    pub townland: f64,
    /// Minimum fuzzy score to accept a county candidate.
    pub county: f64,
    /// Similarity floor handed to fuzzy lookups.
    pub fuzzy_floor: f64,
    /// Candidate cap per (fragment, tier) lookup.
    pub max_candidates: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            townland: 0.75,
            county: 0.7,
            fuzzy_floor: DEFAULT_FUZZY_FLOOR,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    TryTownland,
    TryCounty,
    Fail,
}

/// Resolve role-tagged fragments to the best-supported place.
pub fn resolve(
    index: &GazetteerIndex,
    fragments: &[AddressFragment],
    thresholds: &Thresholds,
) -> GeocodeResult {
    if fragments.is_empty() {
        return GeocodeResult::no_match("");
    }

    // The county fragment resolves independently; its name constrains
    // townland candidates carrying a parent hint.
    let county_fragment = fragments
        .iter()
        .find(|f| f.role == FragmentRole::County);
    let county_best = county_fragment.and_then(|fragment| {
        match_fragment(
            index,
            fragment,
            Tier::County,
            thresholds.max_candidates,
            thresholds.fuzzy_floor,
        )
        .into_iter()
        .next()
    });
    let resolved_county = county_best
        .as_ref()
        .filter(|candidate| candidate.accepted(thresholds.county));

    let mut state = ResolveState::TryTownland;
    loop {
        match state {
            ResolveState::TryTownland => {
                if let Some(candidate) = best_townland(
                    index,
                    fragments,
                    thresholds,
                    resolved_county.map(|c| c.place.normalized_name.as_str()),
                ) {
                    debug!(
                        "Accepted '{}' at townland tier from fragment '{}' (score {:.3})",
                        candidate.place.name, candidate.fragment.text, candidate.score
                    );
                    return GeocodeResult::matched(
                        candidate.place,
                        candidate.score,
                        &candidate.fragment.text,
                    );
                }
                state = ResolveState::TryCounty;
            }
            ResolveState::TryCounty => {
                if let Some(candidate) = resolved_county {
                    debug!(
                        "Accepted '{}' at county tier from fragment '{}' (score {:.3})",
                        candidate.place.name, candidate.fragment.text, candidate.score
                    );
                    return GeocodeResult::matched(
                        candidate.place,
                        candidate.score,
                        &candidate.fragment.text,
                    );
                }
                state = ResolveState::Fail;
            }
            ResolveState::Fail => return GeocodeResult::no_match(""),
        }
    }
}

/// Best acceptable townland candidate across the non-county fragments.
///
/// Fragments tagged Resident never reach the gazetteer. A fragment with
/// no floor-clearing townland candidate behaves as road/local noise.
/// When the county resolved, candidates carrying a parent hint must
/// agree with it; hintless candidates pass the check (accepted loss of
/// precision).
fn best_townland<'g, 'f>(
    index: &'g GazetteerIndex,
    fragments: &'f [AddressFragment],
    thresholds: &Thresholds,
    resolved_county: Option<&str>,
) -> Option<MatchCandidate<'g, 'f>> {
    let mut pool: Vec<MatchCandidate<'g, 'f>> = Vec::new();

    for fragment in fragments {
        if !matches!(
            fragment.role,
            FragmentRole::Unknown | FragmentRole::Townland
        ) {
            continue;
        }
        let candidates = match_fragment(
            index,
            fragment,
            Tier::Townland,
            thresholds.max_candidates,
            thresholds.fuzzy_floor,
        );
        if candidates.is_empty() {
            debug!(
                "No townland candidates for fragment '{}', treating as road/local",
                fragment.text
            );
        }
        pool.extend(candidates);
    }

    // Highest score wins; ties prefer the finer (earlier) fragment. The
    // per-lookup ordering already settled ties within one fragment.
    pool.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.fragment.position.cmp(&b.fragment.position))
    });

    pool.into_iter()
        .filter(|candidate| candidate.accepted(thresholds.townland))
        .find(|candidate| match (resolved_county, &candidate.place.parent_county) {
            (Some(county), Some(hint)) => hint == county,
            _ => true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchedTier, RawPlaceRecord};
    use crate::resolve::segment::segment;

    fn raw(name: &str, tier: Tier, parent: Option<&str>, lat: f64, lon: f64) -> RawPlaceRecord {
        RawPlaceRecord {
            name: name.to_string(),
            tier,
            lat,
            lon,
            parent_hint: parent.map(String::from),
        }
    }

    fn sample_index() -> GazetteerIndex {
        GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None, 52.83, -6.93),
            raw("MAYO", Tier::County, None, 53.91, -9.29),
            raw("KILKENNY", Tier::County, None, 52.65, -7.25),
            raw("BENNEKERRY", Tier::Townland, Some("CARLOW"), 52.8209, -6.8686),
            raw("JOHNSTOWN", Tier::Townland, Some("KILKENNY"), 52.75, -7.55),
            raw("JOHNSTOWN", Tier::Townland, Some("CARLOW"), 52.84, -6.9),
        ])
        .unwrap()
    }

    fn resolve_segments(index: &GazetteerIndex, segments: &[&str]) -> GeocodeResult {
        let thresholds = Thresholds::default();
        let segments: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        let fragments = segment(&segments, index, thresholds.fuzzy_floor);
        resolve(index, &fragments, &thresholds)
    }

    #[test]
    fn test_townland_with_consistent_county() {
        let index = sample_index();
        let result = resolve_segments(&index, &["johnstown", "bennekerry", "carlow"]);

        assert_eq!(result.tier, MatchedTier::Townland);
        assert_eq!(result.matched_name, "BENNEKERRY");
        assert_eq!(result.lat, Some(52.8209));
        assert_eq!(result.lon, Some(-6.8686));
        assert!(result.confidence >= 0.75);
        assert_eq!(result.source_fragment, "bennekerry");
    }

    #[test]
    fn test_county_fallback_when_no_townland_matches() {
        let index = sample_index();
        let result = resolve_segments(&index, &["some road", "mayo"]);

        assert_eq!(result.tier, MatchedTier::County);
        assert_eq!(result.matched_name, "MAYO");
        assert_eq!(result.lat, Some(53.91));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_unknown_county_fails_honestly() {
        let index = sample_index();
        let result = resolve_segments(&index, &["atlantis"]);

        assert_eq!(result.tier, MatchedTier::None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.lat, None);
    }

    #[test]
    fn test_misspelled_county_above_threshold() {
        let index = sample_index();
        // edit distance 1 over 6 characters, similarity ~0.833
        let result = resolve_segments(&index, &["corlow"]);

        assert_eq!(result.tier, MatchedTier::County);
        assert_eq!(result.matched_name, "CARLOW");
        assert!((result.confidence - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
        assert!(result.confidence >= 0.7);
    }

    #[test]
    fn test_misspelled_county_below_threshold() {
        let index = sample_index();
        // "curlew" vs "carlow": distance 2 over 6, similarity ~0.667 < 0.7,
        // above the 0.5 floor so the fragment still reaches the resolver
        let result = resolve_segments(&index, &["curlew"]);

        assert_eq!(result.tier, MatchedTier::None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_parent_hint_disambiguates_duplicate_townland() {
        let index = sample_index();
        let result = resolve_segments(&index, &["johnstown", "kilkenny"]);

        assert_eq!(result.tier, MatchedTier::Townland);
        assert_eq!(result.lat, Some(52.75));
        assert_eq!(result.lon, Some(-7.55));
    }

    #[test]
    fn test_duplicate_townland_without_county_takes_best_score() {
        let index = sample_index();
        let result = resolve_segments(&index, &["johnstown"]);

        // single segment is county-only; no county named johnstown
        assert_eq!(result.tier, MatchedTier::None);

        let result = resolve_segments(&index, &["johnstown", "atlantis"]);
        // demoted county leaves two exact townland hits; insertion order
        // breaks the tie deterministically
        assert_eq!(result.tier, MatchedTier::Townland);
        assert_eq!(result.lat, Some(52.75));
    }

    #[test]
    fn test_inconsistent_hint_falls_back_to_county() {
        let index = GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None, 52.83, -6.93),
            raw("MAYO", Tier::County, None, 53.91, -9.29),
            raw("BENNEKERRY", Tier::Townland, Some("MAYO"), 53.9, -9.3),
        ])
        .unwrap();
        let result = resolve_segments(&index, &["bennekerry", "carlow"]);

        assert_eq!(result.tier, MatchedTier::County);
        assert_eq!(result.matched_name, "CARLOW");
    }

    #[test]
    fn test_hintless_townland_accepted_without_cross_check() {
        let index = GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None, 52.83, -6.93),
            raw("BENNEKERRY", Tier::Townland, None, 52.8209, -6.8686),
        ])
        .unwrap();
        let result = resolve_segments(&index, &["bennekerry", "carlow"]);

        assert_eq!(result.tier, MatchedTier::Townland);
        assert_eq!(result.matched_name, "BENNEKERRY");
    }

    #[test]
    fn test_monotonic_fallback_when_townland_removed() {
        let full = sample_index();
        let with_townland = resolve_segments(&full, &["johnstown", "bennekerry", "carlow"]);
        assert_eq!(with_townland.tier, MatchedTier::Townland);

        let pruned = GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None, 52.83, -6.93),
            raw("MAYO", Tier::County, None, 53.91, -9.29),
            raw("KILKENNY", Tier::County, None, 52.65, -7.25),
            raw("JOHNSTOWN", Tier::Townland, Some("KILKENNY"), 52.75, -7.55),
        ])
        .unwrap();
        let without = resolve_segments(&pruned, &["johnstown", "bennekerry", "carlow"]);

        // never a different townland: johnstown is the resident fragment
        // here and stays excluded, so the result degrades to the county
        assert_eq!(without.tier, MatchedTier::County);
        assert_eq!(without.matched_name, "CARLOW");
    }

    #[test]
    fn test_resident_fragment_never_geocoded() {
        let index = GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None, 52.83, -6.93),
            // a townland that collides with a personal name
            raw("MURPHY", Tier::Townland, Some("CARLOW"), 52.8, -6.9),
            raw("BENNEKERRY", Tier::Townland, Some("CARLOW"), 52.8209, -6.8686),
        ])
        .unwrap();
        let result = resolve_segments(&index, &["murphy", "bennekerry", "carlow"]);

        // first of three segments is the resident, even when it would
        // match a townland exactly
        assert_eq!(result.matched_name, "BENNEKERRY");
    }

    #[test]
    fn test_deterministic() {
        let index = sample_index();
        let first = resolve_segments(&index, &["johnstown", "bennekery", "corlow"]);
        for _ in 0..10 {
            let again = resolve_segments(&index, &["johnstown", "bennekery", "corlow"]);
            assert_eq!(first, again);
        }
    }
}

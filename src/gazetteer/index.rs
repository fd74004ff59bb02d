//! In-memory lookup structure over the reference gazetteer.
//!
//! Built once at startup, read-only afterwards, shared by reference
//! across all resolution requests. Exact lookup is a hash map from
//! normalized name to record set (names collide, within and across
//! tiers). Fuzzy lookup scans the tier with a normalized edit-distance
//! similarity; the townland tier is pre-filtered through buckets keyed
//! by first normalized token to keep the scan bounded.

use hashbrown::HashMap;
use strsim::normalized_levenshtein;
use tracing::info;

use super::GazetteerError;
use crate::models::{PlaceRecord, RawPlaceRecord, Tier};

/// Candidate cap for fuzzy lookups.
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

/// Similarity floor below which fuzzy candidates are discarded.
pub const DEFAULT_FUZZY_FLOOR: f64 = 0.5;

#[derive(Debug, Default)]
struct TierIndex {
    /// Records in insertion order; indices are stable identifiers.
    records: Vec<PlaceRecord>,
    /// normalized name -> record indices. Set-valued: collisions are
    /// expected, not an error.
    by_name: HashMap<String, Vec<usize>>,
    /// first normalized token -> record indices, for the fuzzy pre-filter.
    by_first_token: HashMap<String, Vec<usize>>,
}

impl TierIndex {
    fn insert(&mut self, record: PlaceRecord) {
        let idx = self.records.len();
        self.by_name
            .entry(record.normalized_name.clone())
            .or_default()
            .push(idx);
        self.by_first_token
            .entry(record.first_token().to_string())
            .or_default()
            .push(idx);
        self.records.push(record);
    }

    fn lookup_exact(&self, normalized: &str) -> Vec<&PlaceRecord> {
        self.by_name
            .get(normalized)
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Candidate indices for a fuzzy scan. The county tier is small
    /// enough to scan whole; townlands go through the first-token
    /// buckets: the exact bucket, widened by buckets whose key shares
    /// the query's leading character and is itself within the floor of
    /// the query's first token.
    fn fuzzy_pool(&self, query: &str, floor: f64, prefilter: bool) -> Vec<usize> {
        if !prefilter {
            return (0..self.records.len()).collect();
        }

        let first = query.split_whitespace().next().unwrap_or("");
        if first.is_empty() {
            return Vec::new();
        }

        let mut pool: Vec<usize> = self
            .by_first_token
            .get(first)
            .cloned()
            .unwrap_or_default();

        if let Some(lead) = first.chars().next() {
            for (key, indices) in &self.by_first_token {
                if key.as_str() != first
                    && key.starts_with(lead)
                    && normalized_levenshtein(first, key) >= floor
                {
                    pool.extend_from_slice(indices);
                }
            }
        }

        pool
    }
}

/// The shared reference gazetteer, partitioned by tier.
#[derive(Debug)]
pub struct GazetteerIndex {
    counties: TierIndex,
    townlands: TierIndex,
}

impl GazetteerIndex {
    /// Build the index from loader output. Fails only when a tier ends
    /// up with zero valid records.
    pub fn build(raw: Vec<RawPlaceRecord>) -> Result<Self, GazetteerError> {
        let mut counties = TierIndex::default();
        let mut townlands = TierIndex::default();

        for record in raw {
            let record = PlaceRecord::from_raw(record);
            match record.tier {
                Tier::County => counties.insert(record),
                Tier::Townland => townlands.insert(record),
            }
        }

        let index = Self {
            counties,
            townlands,
        };
        for &tier in Tier::all() {
            if index.tier(tier).records.is_empty() {
                return Err(GazetteerError::EmptyTier { tier });
            }
            info!("Indexed {} {} records", index.tier(tier).records.len(), tier);
        }

        Ok(index)
    }

    fn tier(&self, tier: Tier) -> &TierIndex {
        match tier {
            Tier::County => &self.counties,
            Tier::Townland => &self.townlands,
        }
    }

    /// All records whose normalized name equals `normalized`, in
    /// insertion order.
    pub fn lookup_exact(&self, normalized: &str, tier: Tier) -> Vec<&PlaceRecord> {
        self.tier(tier).lookup_exact(normalized)
    }

    /// Top fuzzy candidates for `query` within a tier, descending by
    /// similarity, capped at `max_candidates`. Ties prefer the shorter
    /// record name, then insertion order. Empty when nothing clears
    /// `floor`; absence is a normal outcome.
    pub fn lookup_fuzzy(
        &self,
        query: &str,
        tier: Tier,
        max_candidates: usize,
        floor: f64,
    ) -> Vec<(&PlaceRecord, f64)> {
        let index = self.tier(tier);
        let pool = index.fuzzy_pool(query, floor, tier == Tier::Townland);

        let mut scored: Vec<(usize, f64)> = pool
            .into_iter()
            .filter_map(|i| {
                let similarity = normalized_levenshtein(query, &index.records[i].normalized_name);
                (similarity >= floor).then_some((i, similarity))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| {
                    index.records[a.0]
                        .normalized_name
                        .len()
                        .cmp(&index.records[b.0].normalized_name.len())
                })
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(max_candidates);

        scored
            .into_iter()
            .map(|(i, similarity)| (&index.records[i], similarity))
            .collect()
    }

    pub fn tier_len(&self, tier: Tier) -> usize {
        self.tier(tier).records.len()
    }

    /// Iterate a tier's records in insertion order.
    pub fn records(&self, tier: Tier) -> impl Iterator<Item = &PlaceRecord> {
        self.tier(tier).records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, tier: Tier, parent: Option<&str>) -> RawPlaceRecord {
        RawPlaceRecord {
            name: name.to_string(),
            tier,
            lat: 53.0,
            lon: -7.0,
            parent_hint: parent.map(String::from),
        }
    }

    fn sample_index() -> GazetteerIndex {
        GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None),
            raw("MAYO", Tier::County, None),
            raw("KILKENNY", Tier::County, None),
            raw("BENNEKERRY", Tier::Townland, Some("CARLOW")),
            raw("JOHNSTOWN", Tier::Townland, Some("CARLOW")),
            raw("JOHNSTOWN", Tier::Townland, Some("KILKENNY")),
            raw("BALLYDUFF", Tier::Townland, Some("KILKENNY")),
        ])
        .unwrap()
    }

    #[test]
    fn test_exact_lookup_is_set_valued() {
        let index = sample_index();
        let hits = index.lookup_exact("johnstown", Tier::Townland);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].parent_county.as_deref(), Some("carlow"));
        assert_eq!(hits[1].parent_county.as_deref(), Some("kilkenny"));
    }

    #[test]
    fn test_exact_lookup_is_tier_scoped() {
        let index = sample_index();
        assert!(index.lookup_exact("carlow", Tier::Townland).is_empty());
        assert_eq!(index.lookup_exact("carlow", Tier::County).len(), 1);
    }

    #[test]
    fn test_fuzzy_similarity_ordering() {
        let index = sample_index();
        let hits = index.lookup_fuzzy("corlow", Tier::County, 5, DEFAULT_FUZZY_FLOOR);
        assert_eq!(hits[0].0.name, "CARLOW");
        // edit distance 1 over 6 characters
        assert!((hits[0].1 - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_floor_filters_everything() {
        let index = sample_index();
        let hits = index.lookup_fuzzy("atlantis", Tier::County, 5, DEFAULT_FUZZY_FLOOR);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_fuzzy_cap() {
        let index = GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None),
            raw("BALLYBEG", Tier::Townland, None),
            raw("BALLYBEGG", Tier::Townland, None),
            raw("BALLYBOG", Tier::Townland, None),
            raw("BALLYBAY", Tier::Townland, None),
        ])
        .unwrap();
        let hits = index.lookup_fuzzy("ballybeg", Tier::Townland, 2, DEFAULT_FUZZY_FLOOR);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.name, "BALLYBEG");
    }

    #[test]
    fn test_fuzzy_tie_prefers_insertion_order() {
        let index = GazetteerIndex::build(vec![
            raw("CARLOW", Tier::County, None),
            raw("BALLINAKILLA", Tier::Townland, Some("first")),
            raw("BALLINAKILLA", Tier::Townland, Some("second")),
        ])
        .unwrap();
        let hits = index.lookup_fuzzy("ballinakill", Tier::Townland, 5, DEFAULT_FUZZY_FLOOR);
        assert_eq!(hits[0].0.name, "BALLINAKILLA");
        assert_eq!(hits[0].0.parent_county.as_deref(), Some("first"));
        assert_eq!(hits[1].0.parent_county.as_deref(), Some("second"));
    }

    #[test]
    fn test_townland_prefilter_reaches_misspelled_first_token() {
        let index = sample_index();
        let hits = index.lookup_fuzzy("bennekery", Tier::Townland, 5, DEFAULT_FUZZY_FLOOR);
        assert_eq!(hits[0].0.name, "BENNEKERRY");
    }

    #[test]
    fn test_empty_tier_is_fatal() {
        let err = GazetteerIndex::build(vec![raw("CARLOW", Tier::County, None)]).unwrap_err();
        assert!(matches!(
            err,
            GazetteerError::EmptyTier {
                tier: Tier::Townland
            }
        ));
    }
}

//! Gazetteer place records and administrative tiers.

use serde::{Deserialize, Serialize};

use crate::resolve::normalize::fold_name;

/// Administrative resolution tier. Counties are coarse, townlands fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    County,
    Townland,
}

impl Tier {
    /// All tiers in hierarchical order (coarsest first).
    pub fn all() -> &'static [Tier] {
        &[Tier::County, Tier::Townland]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::County => "county",
            Tier::Townland => "townland",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Raw record shape handed over by the gazetteer loader, before
/// normalization. One row of the source CSV.
#[derive(Debug, Clone)]
pub struct RawPlaceRecord {
    pub name: String,
    pub tier: Tier,
    pub lat: f64,
    pub lon: f64,
    /// County the record nominally belongs to, when the source supplies it.
    pub parent_hint: Option<String>,
}

/// A reference place in the gazetteer, immutable after load.
///
/// `normalized_name` is always derived from `name` through the same fold
/// the address normalizer applies, so index lookups compare like with
/// like. Names are not unique within or across tiers; ambiguity is
/// resolved downstream, never at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub name: String,
    pub normalized_name: String,
    pub tier: Tier,
    pub center: GeoPoint,
    /// Normalized parent county name, for townlands whose source row
    /// carried one.
    pub parent_county: Option<String>,
}

impl PlaceRecord {
    pub fn from_raw(raw: RawPlaceRecord) -> Self {
        let normalized_name = fold_name(&raw.name);
        let parent_county = raw
            .parent_hint
            .as_deref()
            .map(fold_name)
            .filter(|p| !p.is_empty());

        Self {
            name: raw.name,
            normalized_name,
            tier: raw.tier,
            center: GeoPoint {
                lat: raw.lat,
                lon: raw.lon,
            },
            parent_county,
        }
    }

    /// First whitespace-separated token of the normalized name.
    pub fn first_token(&self) -> &str {
        self.normalized_name.split_whitespace().next().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, tier: Tier) -> RawPlaceRecord {
        RawPlaceRecord {
            name: name.to_string(),
            tier,
            lat: 53.0,
            lon: -7.0,
            parent_hint: None,
        }
    }

    #[test]
    fn test_normalized_name_derived() {
        let record = PlaceRecord::from_raw(raw("BENNEKERRY", Tier::Townland));
        assert_eq!(record.normalized_name, "bennekerry");
    }

    #[test]
    fn test_normalized_name_folds_diacritics() {
        let record = PlaceRecord::from_raw(raw("Dún Mór", Tier::Townland));
        assert_eq!(record.normalized_name, "dun mor");
    }

    #[test]
    fn test_parent_hint_normalized() {
        let mut r = raw("Johnstown", Tier::Townland);
        r.parent_hint = Some("CARLOW".to_string());
        let record = PlaceRecord::from_raw(r);
        assert_eq!(record.parent_county.as_deref(), Some("carlow"));
    }

    #[test]
    fn test_blank_parent_hint_dropped() {
        let mut r = raw("Johnstown", Tier::Townland);
        r.parent_hint = Some("   ".to_string());
        let record = PlaceRecord::from_raw(r);
        assert_eq!(record.parent_county, None);
    }

    #[test]
    fn test_first_token() {
        let record = PlaceRecord::from_raw(raw("WOOD OF O", Tier::Townland));
        assert_eq!(record.first_token(), "wood");
    }
}

//! Terminal geocoding result returned to callers.

use serde::{Deserialize, Serialize};

use super::place::{PlaceRecord, Tier};

/// Resolution tier of the returned match. `None` is the honest-failure
/// outcome; callers branch on this rather than on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedTier {
    Townland,
    County,
    None,
}

impl MatchedTier {
    pub fn label(&self) -> &'static str {
        match self {
            MatchedTier::Townland => "townland",
            MatchedTier::County => "county",
            MatchedTier::None => "none",
        }
    }
}

impl std::fmt::Display for MatchedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Tier> for MatchedTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Townland => MatchedTier::Townland,
            Tier::County => MatchedTier::County,
        }
    }
}

/// Final output of one geocode request.
///
/// Serializes to the wire shape consumed by the HTTP and batch adapters:
/// `lat`/`lon` are omitted entirely for an unmatched address rather than
/// nulled, and a low confidence is reported as-is, never coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    pub tier: MatchedTier,
    pub matched_name: String,
    pub confidence: f64,
    pub source_fragment: String,
}

impl GeocodeResult {
    /// Result for an accepted match against a gazetteer record.
    pub fn matched(place: &PlaceRecord, confidence: f64, source_fragment: &str) -> Self {
        Self {
            lat: Some(place.center.lat),
            lon: Some(place.center.lon),
            tier: place.tier.into(),
            matched_name: place.name.clone(),
            confidence,
            source_fragment: source_fragment.to_string(),
        }
    }

    /// Result for an address that produced no confident match. Covers
    /// both empty input and resolver failure.
    pub fn no_match(source_fragment: &str) -> Self {
        Self {
            lat: None,
            lon: None,
            tier: MatchedTier::None,
            matched_name: String::new(),
            confidence: 0.0,
            source_fragment: source_fragment.to_string(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.tier != MatchedTier::None
    }
}

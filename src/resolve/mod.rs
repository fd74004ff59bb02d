//! The address-to-place resolution engine.
//!
//! One request flows normalize -> segment -> match -> resolve. Every
//! stage is pure with respect to the shared gazetteer, so a [`Geocoder`]
//! can serve any number of concurrent requests without locking.

pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod rewrites;
pub mod segment;

use std::sync::Arc;

use crate::gazetteer::GazetteerIndex;
use crate::models::GeocodeResult;

pub use resolver::Thresholds;
pub use rewrites::TokenRewrites;

/// Resolution service over a shared, read-only gazetteer.
pub struct Geocoder {
    index: Arc<GazetteerIndex>,
    rewrites: TokenRewrites,
    thresholds: Thresholds,
}

impl Geocoder {
    pub fn new(index: Arc<GazetteerIndex>) -> Self {
        Self {
            index,
            rewrites: TokenRewrites::builtin(),
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_settings(
        index: Arc<GazetteerIndex>,
        rewrites: TokenRewrites,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            index,
            rewrites,
            thresholds,
        }
    }

    /// Resolve one free-text address. Never fails: empty input and
    /// unmatched addresses both come back with `tier = none` and their
    /// confidence intact.
    pub fn geocode(&self, address: &str) -> GeocodeResult {
        let segments = normalize::normalize(address, &self.rewrites);
        if segments.is_empty() {
            return GeocodeResult::no_match("");
        }

        let fragments = segment::segment(&segments, &self.index, self.thresholds.fuzzy_floor);
        resolver::resolve(&self.index, &fragments, &self.thresholds)
    }

    pub fn index(&self) -> &GazetteerIndex {
        &self.index
    }
}

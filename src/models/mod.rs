//! Core data models for the geocoding system.

pub mod place;
pub mod result;

pub use place::{GeoPoint, PlaceRecord, RawPlaceRecord, Tier};
pub use result::{GeocodeResult, MatchedTier};

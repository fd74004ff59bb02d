//! Blackthorn - townland-level geocoding for Irish postal addresses
//!
//! This library provides shared types and modules for the serve and batch binaries.

pub mod config;
pub mod gazetteer;
pub mod models;
pub mod resolve;

pub use gazetteer::GazetteerIndex;
pub use models::{GeocodeResult, MatchedTier, PlaceRecord, Tier};
pub use resolve::Geocoder;

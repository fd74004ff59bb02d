//! Gazetteer loading and in-memory lookup.

mod index;
mod loader;

pub use index::{GazetteerIndex, DEFAULT_FUZZY_FLOOR, DEFAULT_MAX_CANDIDATES};
pub use loader::{load_counties, load_townlands, LoadStats};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Tier;

/// Errors raised while building the reference gazetteer. Individual bad
/// rows never surface here; they are counted and skipped by the loader.
#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("failed to read gazetteer file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gazetteer file {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in {}", path.display())]
    MissingColumn { column: &'static str, path: PathBuf },

    #[error("no valid {tier} records loaded")]
    EmptyTier { tier: Tier },
}

/// Load both tier files and build the shared index in one step.
pub fn load<P: AsRef<Path>>(
    counties: P,
    townlands: P,
) -> Result<(GazetteerIndex, LoadStats), GazetteerError> {
    let (mut records, mut stats) = load_counties(counties.as_ref())?;
    let (townland_records, townland_stats) = load_townlands(townlands.as_ref())?;
    records.extend(townland_records);
    stats.merge(townland_stats);

    let index = GazetteerIndex::build(records)?;
    Ok((index, stats))
}

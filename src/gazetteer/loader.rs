//! CSV ETL for the OSi National Placenames Gazetteer exports.
//!
//! The counties file names its places in a `County` column; the
//! townlands file uses `English_Name` and carries the containing county
//! in its own `County` column. Both store the centroid as `X`
//! (longitude) and `Y` (latitude).

use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use super::GazetteerError;
use crate::models::{RawPlaceRecord, Tier};

/// Row counts from one load pass. Malformed rows are skipped, never fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

impl LoadStats {
    pub fn merge(&mut self, other: LoadStats) {
        self.loaded += other.loaded;
        self.skipped += other.skipped;
    }
}

/// Load the county reference file.
pub fn load_counties(path: &Path) -> Result<(Vec<RawPlaceRecord>, LoadStats), GazetteerError> {
    load_tier(path, Tier::County, "County", None)
}

/// Load the townland reference file.
pub fn load_townlands(path: &Path) -> Result<(Vec<RawPlaceRecord>, LoadStats), GazetteerError> {
    load_tier(path, Tier::Townland, "English_Name", Some("County"))
}

fn load_tier(
    path: &Path,
    tier: Tier,
    name_column: &'static str,
    parent_column: Option<&'static str>,
) -> Result<(Vec<RawPlaceRecord>, LoadStats), GazetteerError> {
    info!("Loading {} gazetteer from {}", tier, path.display());

    let file = File::open(path).map_err(|source| GazetteerError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| GazetteerError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let column = |column: &'static str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| GazetteerError::MissingColumn {
                column,
                path: path.to_path_buf(),
            })
    };

    let name_idx = column(name_column)?;
    let x_idx = column("X")?;
    let y_idx = column("Y")?;
    let parent_idx = match parent_column {
        Some(col) => Some(column(col)?),
        None => None,
    };

    let mut records = Vec::new();
    let mut stats = LoadStats::default();

    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping unreadable row {} in {}: {}", row + 2, path.display(), err);
                stats.skipped += 1;
                continue;
            }
        };

        let name = record.get(name_idx).unwrap_or("").trim();
        let lon = record.get(x_idx).unwrap_or("").trim().parse::<f64>();
        let lat = record.get(y_idx).unwrap_or("").trim().parse::<f64>();

        let (lon, lat) = match (name.is_empty(), lon, lat) {
            (false, Ok(lon), Ok(lat)) => (lon, lat),
            _ => {
                warn!("Skipping malformed row {} in {}", row + 2, path.display());
                stats.skipped += 1;
                continue;
            }
        };

        let parent_hint = parent_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);

        records.push(RawPlaceRecord {
            name: name.to_string(),
            tier,
            lat,
            lon,
            parent_hint,
        });
        stats.loaded += 1;
    }

    info!(
        "Loaded {} {} records ({} skipped)",
        stats.loaded, tier, stats.skipped
    );

    Ok((records, stats))
}

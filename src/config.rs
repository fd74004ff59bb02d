//! Optional TOML configuration for threshold tuning and synonym lists.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolve::Thresholds;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Extra synonym mappings in addition to the built-in tables.
    #[serde(default)]
    pub synonyms_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThresholdConfig {
    pub townland: f64,
    pub county: f64,
    pub fuzzy_floor: f64,
    pub max_candidates: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let defaults = Thresholds::default();
        Self {
            townland: defaults.townland,
            county: defaults.county,
            fuzzy_floor: defaults.fuzzy_floor,
            max_candidates: defaults.max_candidates,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            townland: self.thresholds.townland,
            county: self.thresholds.county,
            fuzzy_floor: self.thresholds.fuzzy_floor,
            max_candidates: self.thresholds.max_candidates,
        }
    }
}

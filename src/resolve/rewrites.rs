//! Token-level rewrites applied during address normalization.
//!
//! Two tables: tokens dropped outright (the "Co"/"County" markers that
//! precede a county name but never appear in gazetteer names) and
//! abbreviation expansions ("st" -> "saint"). Expansion targets are
//! never themselves keys, which keeps normalization idempotent.

use anyhow::{Context, Result};
use hashbrown::{HashMap, HashSet};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TokenRewrites {
    /// Token -> canonical replacement
    replacements: HashMap<String, String>,
    /// Tokens removed entirely
    dropped: HashSet<String>,
}

impl TokenRewrites {
    pub fn empty() -> Self {
        Self {
            replacements: HashMap::new(),
            dropped: HashSet::new(),
        }
    }

    /// Built-in tables covering the county marker and the abbreviations
    /// that show up in Irish postal addresses.
    pub fn builtin() -> Self {
        let mut rewrites = Self::empty();

        for marker in ["co", "county"] {
            rewrites.dropped.insert(marker.to_string());
        }

        for (abbr, full) in [
            ("st", "saint"),
            ("mt", "mount"),
            ("rd", "road"),
            ("ave", "avenue"),
            ("upr", "upper"),
            ("lwr", "lower"),
            ("gt", "great"),
            ("lt", "little"),
        ] {
            rewrites
                .replacements
                .insert(abbr.to_string(), full.to_string());
        }

        rewrites
    }

    /// Load additional mappings from a synonym file.
    ///
    /// Format, one mapping per line: `variant, variant => canonical`
    /// maps each left-hand token to the canonical form; `canonical,
    /// variant, variant` treats the first entry as canonical. A `#`
    /// starts a comment. A missing file is a warning, not an error.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Synonym file not found: {}", path.display());
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read synonym file: {}", path.display()))?;

        let comment_regex = Regex::new(r"#.*").unwrap();
        let whitespace_regex = Regex::new(r"\s+").unwrap();

        let before = self.replacements.len();
        for line in content.lines() {
            let line = comment_regex.replace(line, "");
            let line = line.trim().to_lowercase();
            if line.is_empty() {
                continue;
            }
            let line = whitespace_regex.replace_all(&line, " ");

            if let Some((lefts, rights)) = line.split_once("=>") {
                // explicit mapping: left => right, first right is canonical
                if let Some(target) = rights.split(',').next() {
                    let target = target.trim().to_string();
                    for src in lefts.split(',') {
                        let src = src.trim();
                        if !src.is_empty() && src != target {
                            self.replacements.insert(src.to_string(), target.clone());
                        }
                    }
                }
            } else {
                // equivalent list: "a, b, c" maps b->a, c->a
                let mut parts = line.split(',');
                if let Some(canon) = parts.next() {
                    let canon = canon.trim().to_string();
                    for variant in parts {
                        let variant = variant.trim();
                        if !variant.is_empty() && variant != canon {
                            self.replacements.insert(variant.to_string(), canon.clone());
                        }
                    }
                }
            }
        }

        info!(
            "Loaded {} synonym mappings from {}",
            self.replacements.len() - before,
            path.display()
        );
        Ok(())
    }

    /// Rewrite one normalized segment token by token.
    pub fn apply(&self, segment: &str) -> String {
        let mut result: Vec<&str> = Vec::new();
        for token in segment.split_whitespace() {
            if self.dropped.contains(token) {
                continue;
            }
            match self.replacements.get(token) {
                Some(replacement) => result.push(replacement.as_str()),
                None => result.push(token),
            }
        }
        result.join(" ")
    }
}

impl Default for TokenRewrites {
    fn default() -> Self {
        Self::builtin()
    }
}

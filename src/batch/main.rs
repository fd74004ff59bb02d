//! Bulk geocoding pipeline.
//!
//! Reads a CSV of addresses, resolves each against the in-memory
//! gazetteer in parallel, and reports per-tier totals and throughput.
//! Optionally writes a results CSV alongside.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use blackthorn::config::Config;
use blackthorn::models::{MatchedTier, Tier};
use blackthorn::resolve::TokenRewrites;
use blackthorn::{gazetteer, GeocodeResult, Geocoder};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(about = "Bulk geocode a CSV of addresses")]
struct Args {
    /// Addresses CSV, one address in the first column per row
    #[arg(short, long)]
    file: PathBuf,

    /// Counties gazetteer CSV
    #[arg(long)]
    counties: PathBuf,

    /// Townlands gazetteer CSV
    #[arg(long)]
    townlands: PathBuf,

    /// Treat the first row as a header
    #[arg(long)]
    has_header: bool,

    /// Write per-address results to this CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional TOML config for thresholds and synonyms
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Blackthorn Batch Geocoder");
    info!("File: {}", args.file.display());

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let (index, stats) = gazetteer::load(&args.counties, &args.townlands)
        .context("Failed to load gazetteer")?;
    info!(
        "Gazetteer ready: {} counties, {} townlands ({} rows skipped)",
        index.tier_len(Tier::County),
        index.tier_len(Tier::Townland),
        stats.skipped
    );

    let mut rewrites = TokenRewrites::builtin();
    if let Some(path) = &config.synonyms_file {
        rewrites.load_from_file(path)?;
    }

    let geocoder = Geocoder::with_settings(Arc::new(index), rewrites, config.thresholds());

    let addresses = read_addresses(&args)?;
    info!("Geocoding {} addresses", addresses.len());

    let pb = ProgressBar::new(addresses.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results: Vec<GeocodeResult> = addresses
        .par_iter()
        .map(|address| {
            let result = geocoder.geocode(address);
            pb.inc(1);
            result
        })
        .collect();
    let elapsed = start.elapsed();

    pb.finish_with_message("Geocoding complete");

    let townland = results
        .iter()
        .filter(|r| r.tier == MatchedTier::Townland)
        .count();
    let county = results
        .iter()
        .filter(|r| r.tier == MatchedTier::County)
        .count();
    let unmatched = results.len() - townland - county;

    info!(
        "Total addresses: {}, townland level: {}, county level: {}, unmatched: {}",
        results.len(),
        townland,
        county,
        unmatched
    );
    info!(
        "Total time: {:.2}s ({:.1} addresses/s)",
        elapsed.as_secs_f64(),
        results.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    if let Some(output) = &args.output {
        write_results(output, &addresses, &results)?;
        info!("Results written to {}", output.display());
    }

    Ok(())
}

fn read_addresses(args: &Args) -> Result<Vec<String>> {
    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open addresses file {}", args.file.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(args.has_header)
        .flexible(true)
        .from_reader(file);

    let mut addresses = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(address) = record.get(0) {
            let address = address.trim();
            if !address.is_empty() {
                addresses.push(address.to_string());
            }
        }
    }
    Ok(addresses)
}

fn write_results(output: &Path, addresses: &[String], results: &[GeocodeResult]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;

    writer.write_record(["address", "lat", "lon", "tier", "matched_name", "confidence"])?;
    for (address, result) in addresses.iter().zip(results) {
        let lat = result.lat.map(|v| v.to_string()).unwrap_or_default();
        let lon = result.lon.map(|v| v.to_string()).unwrap_or_default();
        let confidence = format!("{:.4}", result.confidence);
        writer.write_record([
            address.as_str(),
            lat.as_str(),
            lon.as_str(),
            result.tier.label(),
            result.matched_name.as_str(),
            confidence.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

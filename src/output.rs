//! Output formatting and persistence for aggregated wind records.
//!
//! Supports pretty-printing, JSON serialization, and CSV files (plain or gzip).

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::wind::AggregateRecord;

const KMH_PER_MS: f64 = 3.6;

/// Unit of `mean_speed` in the written output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpeedUnit {
    #[default]
    MetresPerSecond,
    KilometresPerHour,
}

impl SpeedUnit {
    /// Converts a speed in m/s to this unit.
    pub fn convert(self, metres_per_second: f64) -> f64 {
        match self {
            SpeedUnit::MetresPerSecond => metres_per_second,
            SpeedUnit::KilometresPerHour => metres_per_second * KMH_PER_MS,
        }
    }
}

/// One row of the output table.
#[derive(Debug, Serialize, PartialEq)]
pub struct OutputRow {
    pub bucket_start: String,
    pub mean_speed: f64,
    pub mean_direction: f64,
    pub bearing: f64,
    pub sigma_theta: Option<f64>,
}

impl OutputRow {
    pub fn from_record(record: &AggregateRecord, unit: SpeedUnit) -> Self {
        Self {
            bucket_start: record.bucket_start.format("%Y-%m-%d %H:%M:%S").to_string(),
            mean_speed: unit.convert(record.mean_speed),
            mean_direction: record.mean_direction,
            bearing: record.bearing(),
            sigma_theta: record.sigma_theta,
        }
    }
}

fn rows(records: &[AggregateRecord], unit: SpeedUnit) -> Vec<OutputRow> {
    records
        .iter()
        .map(|r| OutputRow::from_record(r, unit))
        .collect()
}

/// Logs the output rows using Rust's debug pretty-print format.
pub fn print_pretty(records: &[AggregateRecord], unit: SpeedUnit) {
    info!("{}", to_pretty(records, unit));
}

pub fn to_pretty(records: &[AggregateRecord], unit: SpeedUnit) -> String {
    format!("{:#?}", rows(records, unit))
}

/// Logs records as a pretty-printed JSON array.
pub fn print_json(records: &[AggregateRecord], unit: SpeedUnit) -> Result<()> {
    info!("{}", to_json(records, unit)?);
    Ok(())
}

pub fn to_json(records: &[AggregateRecord], unit: SpeedUnit) -> Result<String> {
    Ok(serde_json::to_string_pretty(&rows(records, unit))?)
}

/// Serializes records as CSV with a header row into `writer`.
pub fn write_csv<W: Write>(writer: W, records: &[AggregateRecord], unit: SpeedUnit) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows(records, unit) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes records to a CSV file at `path`, replacing any existing file.
///
/// With `gzip` the file content is gzip-compressed.
pub fn write_records(
    path: &str,
    records: &[AggregateRecord],
    unit: SpeedUnit,
    gzip: bool,
) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    debug!(path, gzip, records = records.len(), "Writing CSV records");

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv(&mut encoder, records, unit)?;
        encoder.finish()?;
    } else {
        write_csv(file, records, unit)?;
    }

    Ok(())
}

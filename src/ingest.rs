//! CSV ingestion of sound level meter exports.
//!
//! Only the timestamp, wind speed and wind direction columns are read; the
//! acoustic and weather columns (`LAeq`, `Amb. Humidity`, ...) are ignored.

use std::io::Read;

use chrono::NaiveDateTime;
use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ColumnConfig;
use crate::wind::Observation;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to decompress input: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing column {header:?} for {field}")]
    MissingColumn { field: &'static str, header: String },
    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
    },
}

/// Decodes CSV bytes (optionally gzip-compressed) into observations.
///
/// Rows whose timestamp is empty or unparseable are dropped with a warning.
///
/// # Errors
///
/// Fails if a mapped column is missing or a speed/direction cell is not a
/// number.
pub fn parse_observations(
    bytes: &[u8],
    columns: &ColumnConfig,
) -> Result<Vec<Observation>, IngestError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut decoded)?;
        debug!(compressed = bytes.len(), decoded = decoded.len(), "Gzip input decoded");
        return parse_csv(&decoded, columns);
    }
    parse_csv(bytes, columns)
}

fn parse_csv(bytes: &[u8], columns: &ColumnConfig) -> Result<Vec<Observation>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let index_of = |field: &'static str, header: &str| {
        headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| IngestError::MissingColumn {
                field,
                header: header.to_string(),
            })
    };
    let mut indices = [0usize; 3];
    for (slot, (field, header)) in indices.iter_mut().zip(columns.iter()) {
        *slot = index_of(field, header)?;
    }
    let [ts_idx, speed_idx, dir_idx] = indices;

    let mut observations = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_ts = record.get(ts_idx).unwrap_or("");
        let Some(timestamp) = parse_timestamp(raw_ts) else {
            warn!(line, value = raw_ts, "Dropping row with unparseable timestamp");
            dropped += 1;
            continue;
        };

        let speed = parse_number(&record, speed_idx, "speed", line)?;
        let direction = parse_number(&record, dir_idx, "direction", line)?;

        observations.push(Observation::new(timestamp, speed, direction));
    }

    debug!(rows = observations.len(), dropped, "CSV export parsed");
    Ok(observations)
}

/// Parses a spreadsheet timestamp in any of the accepted layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    field: &'static str,
    line: u64,
) -> Result<f64, IngestError> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestError::InvalidNumber {
            line,
            field,
            value: raw.to_string(),
        })
}

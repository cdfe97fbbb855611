//! End-to-end processing of one export: parse, then aggregate.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::ColumnConfig;
use crate::ingest::parse_observations;
use crate::wind::{AggregateRecord, BucketWidth, GridOrigin, aggregate_with_origin};

/// Parses the export in `bytes` and aggregates its wind samples.
pub fn aggregate_export(
    bytes: &[u8],
    columns: &ColumnConfig,
    width: BucketWidth,
    origin: GridOrigin,
) -> Result<Vec<AggregateRecord>> {
    let observations = parse_observations(bytes, columns).context("parsing export")?;
    let records =
        aggregate_with_origin(&observations, width, origin).context("aggregating wind samples")?;

    info!(
        observations = observations.len(),
        buckets = records.len(),
        "Export aggregated"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_is_reported() {
        let csv = "Start Time,Wind Speed avg,Wind Dir. avg\n2025-08-28 10:00:00,x,90\n";
        let err = aggregate_export(
            csv.as_bytes(),
            &ColumnConfig::default(),
            BucketWidth::default(),
            GridOrigin::Epoch,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid speed"));
    }

    #[test]
    fn test_header_only_export() {
        let csv = "Start Time,Wind Speed avg,Wind Dir. avg\n";
        let records = aggregate_export(
            csv.as_bytes(),
            &ColumnConfig::default(),
            BucketWidth::default(),
            GridOrigin::Epoch,
        )
        .unwrap();
        assert!(records.is_empty());
    }
}

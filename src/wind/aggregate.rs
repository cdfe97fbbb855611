use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::wind::bucket::{bucket_start, grid_anchor};
use crate::wind::circular::direction_stats;
use crate::wind::error::WindError;
use crate::wind::types::{AggregateRecord, BucketWidth, GridOrigin, Observation};

/// Groups `observations` into epoch-aligned buckets of `width` and computes
/// mean speed, circular mean direction and sigma-theta for each non-empty
/// bucket.
///
/// Records come back in ascending bucket order. Empty buckets are omitted.
///
/// # Errors
///
/// Returns [`WindError::NonFiniteSample`] if any speed or direction is NaN or
/// infinite. No partial result is produced.
pub fn aggregate(
    observations: &[Observation],
    width: BucketWidth,
) -> Result<Vec<AggregateRecord>, WindError> {
    aggregate_with_origin(observations, width, GridOrigin::Epoch)
}

/// Same as [`aggregate`], with an explicit grid anchor.
pub fn aggregate_with_origin(
    observations: &[Observation],
    width: BucketWidth,
    origin: GridOrigin,
) -> Result<Vec<AggregateRecord>, WindError> {
    for obs in observations {
        check_finite(obs)?;
    }

    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by_key(|o| o.timestamp);

    let Some(first) = sorted.first() else {
        return Ok(Vec::new());
    };
    let anchor = grid_anchor(origin, first.timestamp);

    let mut records = Vec::new();
    let mut current: Option<NaiveDateTime> = None;
    let mut speeds = Vec::new();
    let mut directions = Vec::new();

    for obs in sorted {
        let start = bucket_start(obs.timestamp, anchor, width);
        if current.is_some_and(|c| c != start) {
            records.extend(flush(current, &mut speeds, &mut directions));
        }
        current = Some(start);
        speeds.push(obs.speed);
        directions.push(obs.direction);
    }
    records.extend(flush(current, &mut speeds, &mut directions));

    let degenerate = records.iter().filter(|r| r.is_degenerate()).count();
    debug!(
        observations = observations.len(),
        buckets = records.len(),
        degenerate,
        "Wind aggregation complete"
    );

    Ok(records)
}

fn check_finite(obs: &Observation) -> Result<(), WindError> {
    for (field, value) in [("speed", obs.speed), ("direction", obs.direction)] {
        if !value.is_finite() {
            return Err(WindError::NonFiniteSample {
                timestamp: obs.timestamp,
                field,
                value,
            });
        }
    }
    Ok(())
}

/// Reduces the buffered samples of one bucket into a record, leaving the
/// buffers empty.
fn flush(
    bucket_start: Option<NaiveDateTime>,
    speeds: &mut Vec<f64>,
    directions: &mut Vec<f64>,
) -> Option<AggregateRecord> {
    let bucket_start = bucket_start?;
    let stats = direction_stats(directions)?;
    let mean_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;

    trace!(
        %bucket_start,
        samples = speeds.len(),
        resultant_length = stats.resultant_length,
        "Bucket reduced"
    );
    if stats.sigma_theta.is_none() {
        debug!(%bucket_start, "Directions cancel out, sigma-theta undefined");
    }

    speeds.clear();
    directions.clear();

    Some(AggregateRecord {
        bucket_start,
        mean_speed,
        mean_direction: stats.mean_direction,
        sigma_theta: stats.sigma_theta,
    })
}

//! Data types shared by the wind aggregation pipeline.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::wind::DIRECTION_OFFSET_DEG;
use crate::wind::error::WindError;

/// A single wind sample taken by the monitoring station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    /// Non-negative speed in the unit of the export (m/s for sound level meters).
    pub speed: f64,
    /// Meteorological bearing in degrees.
    pub direction: f64,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, speed: f64, direction: f64) -> Self {
        Self {
            timestamp,
            speed,
            direction,
        }
    }
}

/// Width of a time bucket. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWidth(TimeDelta);

impl BucketWidth {
    /// Wraps `width`, rejecting zero and negative durations.
    pub fn new(width: TimeDelta) -> Result<Self, WindError> {
        if width <= TimeDelta::zero() {
            return Err(WindError::InvalidBucketWidth {
                seconds: width.num_seconds(),
            });
        }
        Ok(Self(width))
    }

    pub fn from_minutes(minutes: i64) -> Result<Self, WindError> {
        Self::new(TimeDelta::try_minutes(minutes).ok_or(WindError::InvalidBucketWidth {
            seconds: minutes.saturating_mul(60),
        })?)
    }

    pub fn from_seconds(seconds: i64) -> Result<Self, WindError> {
        Self::new(
            TimeDelta::try_seconds(seconds).ok_or(WindError::InvalidBucketWidth { seconds })?,
        )
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

impl Default for BucketWidth {
    fn default() -> Self {
        Self(TimeDelta::minutes(5))
    }
}

/// Where the bucket grid is anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GridOrigin {
    /// Multiples of the width since 1970-01-01T00:00:00.
    #[default]
    Epoch,
    /// Multiples of the width since midnight of the earliest observation's day.
    StartDay,
}

/// Aggregated wind statistics for one non-empty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub bucket_start: NaiveDateTime,
    pub mean_speed: f64,
    /// Circular mean in the rotated frame, in `(-180, 180]`; a mean of
    /// exactly -180 is reported as 180.
    pub mean_direction: f64,
    /// Angular standard deviation in degrees. `None` when the samples cancel
    /// out and the dispersion is undefined.
    pub sigma_theta: Option<f64>,
}

impl AggregateRecord {
    /// Mean direction back in the bearing frame of the input, in `[0, 360)`.
    pub fn bearing(&self) -> f64 {
        let b = (self.mean_direction + DIRECTION_OFFSET_DEG).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if b >= 360.0 { 0.0 } else { b }
    }

    /// Whether the directional spread could not be computed for this bucket.
    pub fn is_degenerate(&self) -> bool {
        self.sigma_theta.is_none()
    }
}

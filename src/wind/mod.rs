//! Wind direction aggregation.
//!
//! Groups raw wind samples into fixed-width time buckets and reduces each
//! bucket to a mean speed, a circular mean direction and sigma-theta.
//!
//! Directions must be meteorological bearings (degrees clockwise from north,
//! the direction the wind blows from) as exported by the sound level meter.
//! They are rotated by [`DIRECTION_OFFSET_DEG`] before averaging, and the
//! returned `mean_direction` stays in that rotated frame. Use
//! [`AggregateRecord::bearing`] to get back to the input convention.

pub mod aggregate;
pub mod bucket;
pub mod circular;
pub mod error;
pub mod types;

pub use aggregate::{aggregate, aggregate_with_origin};
pub use error::WindError;
pub use types::{AggregateRecord, BucketWidth, GridOrigin, Observation};

/// Rotation applied to every bearing before the vector average.
pub const DIRECTION_OFFSET_DEG: f64 = 270.0;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised by wind aggregation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WindError {
    #[error("bucket width must be positive, got {seconds}s")]
    InvalidBucketWidth { seconds: i64 },
    #[error("non-finite {field} ({value}) in sample at {timestamp}")]
    NonFiniteSample {
        timestamp: NaiveDateTime,
        field: &'static str,
        value: f64,
    },
}

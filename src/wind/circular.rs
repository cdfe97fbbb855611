//! Circular statistics over wind directions.
//!
//! Directions are rotated by [`DIRECTION_OFFSET_DEG`] before the vector
//! average, so the mean comes back in the rotated frame. Sigma-theta is the
//! vector-length estimate `sqrt(-2 ln R)`.

use super::DIRECTION_OFFSET_DEG;

/// Resultant lengths below this are treated as fully cancelling.
pub const R_EPSILON: f64 = 1e-12;

/// Direction statistics of one group of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionStats {
    /// `atan2(S, C)` in degrees, rotated frame, in `(-180, 180]`.
    pub mean_direction: f64,
    /// Mean resultant length, clamped to `[0, 1]`.
    pub resultant_length: f64,
    pub sigma_theta: Option<f64>,
}

/// Computes the circular mean and sigma-theta of `directions` (degrees).
///
/// Returns `None` for an empty slice.
pub fn direction_stats(directions: &[f64]) -> Option<DirectionStats> {
    if directions.is_empty() {
        return None;
    }

    let n = directions.len() as f64;
    let (sum_sin, sum_cos) = directions.iter().fold((0.0, 0.0), |(s, c), d| {
        let rad = (d - DIRECTION_OFFSET_DEG).to_radians();
        (s + rad.sin(), c + rad.cos())
    });
    let mean_sin = sum_sin / n;
    let mean_cos = sum_cos / n;

    let mut mean_direction = mean_sin.atan2(mean_cos).to_degrees();
    // atan2 returns -pi for a tiny negative sine; keep the range half-open
    if mean_direction <= -180.0 {
        mean_direction = 180.0;
    }
    let resultant_length = mean_sin.hypot(mean_cos).min(1.0);

    Some(DirectionStats {
        mean_direction,
        resultant_length,
        sigma_theta: sigma_theta(resultant_length),
    })
}

/// Angular standard deviation in degrees for a mean resultant length `r`.
///
/// `r` above one is clamped, so rounding never produces a negative root.
/// Below [`R_EPSILON`] the logarithm diverges and the result is `None`.
pub fn sigma_theta(r: f64) -> Option<f64> {
    if r.is_nan() || r < R_EPSILON {
        return None;
    }
    let log_r = r.min(1.0).ln();
    if log_r >= 0.0 {
        return Some(0.0);
    }
    Some((-2.0 * log_r).sqrt().to_degrees())
}

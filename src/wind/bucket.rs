//! Fixed-grid time bucketing.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use super::types::{BucketWidth, GridOrigin};

/// Resolves the grid anchor for a set of samples whose earliest timestamp is
/// `first`.
pub fn grid_anchor(origin: GridOrigin, first: NaiveDateTime) -> NaiveDateTime {
    match origin {
        GridOrigin::Epoch => DateTime::<Utc>::UNIX_EPOCH.naive_utc(),
        GridOrigin::StartDay => first.date().and_time(chrono::NaiveTime::MIN),
    }
}

/// Truncates `ts` to the start of its bucket: the largest
/// `anchor + k * width` not after `ts`.
pub fn bucket_start(ts: NaiveDateTime, anchor: NaiveDateTime, width: BucketWidth) -> NaiveDateTime {
    let width_ns = total_nanos(width.as_delta());
    let offset_ns = total_nanos(ts - anchor);
    let start_ns = offset_ns.div_euclid(width_ns) * width_ns;
    anchor
        + TimeDelta::seconds(start_ns.div_euclid(NANOS_PER_SEC) as i64)
        + TimeDelta::nanoseconds(start_ns.rem_euclid(NANOS_PER_SEC) as i64)
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

// i128 so the full TimeDelta range fits without truncation
fn total_nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * NANOS_PER_SEC + i128::from(delta.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 28)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_bucket_start_epoch_five_minutes() {
        let w = BucketWidth::default();
        let anchor = grid_anchor(GridOrigin::Epoch, at(0, 1, 0));
        assert_eq!(bucket_start(at(0, 1, 0), anchor, w), at(0, 0, 0));
        assert_eq!(bucket_start(at(0, 4, 59), anchor, w), at(0, 0, 0));
        assert_eq!(bucket_start(at(0, 5, 0), anchor, w), at(0, 5, 0));
        assert_eq!(bucket_start(at(13, 37, 12), anchor, w), at(13, 35, 0));
    }

    #[test]
    fn test_bucket_start_before_epoch() {
        let w = BucketWidth::default();
        let ts = NaiveDate::from_ymd_opt(1969, 12, 31)
            .unwrap()
            .and_hms_opt(23, 58, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(1969, 12, 31)
            .unwrap()
            .and_hms_opt(23, 55, 0)
            .unwrap();
        assert_eq!(bucket_start(ts, DateTime::<Utc>::UNIX_EPOCH.naive_utc(), w), expected);
    }

    #[test]
    fn test_sub_second_before_epoch_stays_left_closed() {
        let w = BucketWidth::default();
        let ts = NaiveDate::from_ymd_opt(1969, 12, 31)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 999_500)
            .unwrap();
        let anchor = grid_anchor(GridOrigin::Epoch, ts);
        let start = bucket_start(ts, anchor, w);

        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(1969, 12, 31)
                .unwrap()
                .and_hms_opt(23, 55, 0)
                .unwrap()
        );
        assert!(start <= ts && ts < start + w.as_delta());
    }

    #[test]
    fn test_width_not_whole_milliseconds() {
        let w = BucketWidth::new(TimeDelta::microseconds(1500)).unwrap();
        // 2025-08-28 00:00 is a whole number of 1.5 ms steps after the epoch
        let t0 = at(0, 0, 0);
        let anchor = grid_anchor(GridOrigin::Epoch, t0);

        assert_eq!(bucket_start(t0, anchor, w), t0);
        assert_eq!(bucket_start(t0 + TimeDelta::microseconds(1200), anchor, w), t0);
        assert_eq!(
            bucket_start(t0 + TimeDelta::microseconds(1500), anchor, w),
            t0 + TimeDelta::microseconds(1500)
        );
        assert_eq!(
            bucket_start(t0 + TimeDelta::microseconds(3100), anchor, w),
            t0 + TimeDelta::microseconds(3000)
        );
    }

    #[test]
    fn test_start_day_differs_for_widths_not_dividing_a_day() {
        let w = BucketWidth::from_minutes(7).unwrap();
        let day_of = |h, m| {
            NaiveDate::from_ymd_opt(2025, 8, 29)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };
        let first = day_of(0, 3);

        let day = grid_anchor(GridOrigin::StartDay, first);
        assert_eq!(day, day_of(0, 0));
        assert_eq!(bucket_start(day_of(0, 8), day, w), day_of(0, 7));

        // 20329 days after the epoch; 20329 * 1440 % 7 == 5
        let epoch = grid_anchor(GridOrigin::Epoch, first);
        assert_eq!(bucket_start(day_of(0, 8), epoch, w), day_of(0, 2));
    }

    #[test]
    fn test_origins_agree_when_width_divides_a_day() {
        let w = BucketWidth::from_minutes(15).unwrap();
        let first = at(6, 20, 0);
        let epoch = grid_anchor(GridOrigin::Epoch, first);
        let day = grid_anchor(GridOrigin::StartDay, first);
        for ts in [at(6, 20, 0), at(6, 44, 59), at(23, 59, 59)] {
            assert_eq!(bucket_start(ts, epoch, w), bucket_start(ts, day, w));
        }
    }
}

//! Equi-width integer histogram.

use std::fmt;

use tracing::trace;

use crate::executor::PredicateOp;

use super::error::StatsError;

/// Fixed-width histogram over an inclusive integer range `[min, max]`.
///
/// The range is split into `b` buckets of real-valued width
/// `(max - min + 1) / b`; bucket `i` covers `[min + i*width, min + (i+1)*width)`.
/// Each bucket keeps only a count, so recording a value is O(1) in time and
/// space. Estimates assume values are uniformly distributed inside a bucket.
///
/// Only values with `min <= v < max` are recorded. A value equal to `max`
/// is dropped and does not count towards [`ntups`](IntHistogram::ntups);
/// callers that need `max` counted build the histogram over `max + 1`.
#[derive(Debug, Clone)]
pub struct IntHistogram {
    buckets: Vec<u64>,
    min: i32,
    max: i32,
    width: f64,
    ntups: u64,
}

impl IntHistogram {
    /// Creates an empty histogram with `buckets` buckets over `[min, max]`.
    pub fn new(buckets: usize, min: i32, max: i32) -> Result<Self, StatsError> {
        if buckets == 0 {
            return Err(StatsError::InvalidBucketCount(buckets));
        }
        if min > max {
            return Err(StatsError::InvalidRange { min, max });
        }
        let width = (f64::from(max) - f64::from(min) + 1.0) / buckets as f64;
        Ok(Self {
            buckets: vec![0; buckets],
            min,
            max,
            width,
            ntups: 0,
        })
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of values recorded so far.
    pub fn ntups(&self) -> u64 {
        self.ntups
    }

    /// Returns the bucket holding `v`.
    ///
    /// Fails with [`StatsError::ValueOutOfRange`] if `v` is outside `[min, max]`.
    pub fn bucket_index(&self, v: i32) -> Result<usize, StatsError> {
        if v < self.min || v > self.max {
            return Err(StatsError::ValueOutOfRange {
                value: v,
                min: self.min,
                max: self.max,
            });
        }
        Ok(self.index_of(i64::from(v)))
    }

    /// Index of an in-range value. Float rounding is clamped to the last bucket.
    fn index_of(&self, v: i64) -> usize {
        let offset = (v - i64::from(self.min)) as f64;
        let index = (offset / self.width).floor().max(0.0) as usize;
        index.min(self.buckets.len() - 1)
    }

    /// Records `v` if `min <= v < max`; other values are ignored.
    pub fn add_value(&mut self, v: i32) {
        if v < self.min || v >= self.max {
            trace!(value = v, min = self.min, max = self.max, "histogram value dropped");
            return;
        }
        let index = self.index_of(i64::from(v));
        self.buckets[index] += 1;
        self.ntups += 1;
    }

    /// Estimates the fraction of recorded values satisfying `value OP v`.
    ///
    /// The result is always within `[0, 1]`. `LIKE` has no meaningful
    /// estimate over integers and yields 0.0.
    pub fn estimate_selectivity(&self, op: PredicateOp, v: i32) -> f64 {
        let v = i64::from(v);
        let estimate = match op {
            PredicateOp::LessThan => self.less_than(v),
            PredicateOp::LessThanOrEq => self.less_than(v + 1),
            PredicateOp::GreaterThan => 1.0 - self.less_than(v + 1),
            PredicateOp::GreaterThanOrEq => 1.0 - self.less_than(v),
            PredicateOp::Equals => self.less_than(v + 1) - self.less_than(v),
            PredicateOp::NotEquals => 1.0 - (self.less_than(v + 1) - self.less_than(v)),
            PredicateOp::Like => 0.0,
        };
        estimate.clamp(0.0, 1.0)
    }

    /// Fraction of recorded values strictly below `v`.
    fn less_than(&self, v: i64) -> f64 {
        if v >= i64::from(self.max) {
            return 1.0;
        }
        if v < i64::from(self.min) || self.ntups == 0 {
            return 0.0;
        }

        let index = self.index_of(v);
        let before: u64 = self.buckets[..index].iter().sum();
        let count = self.buckets[index] as f64;
        let lower = index as f64 * self.width + f64::from(self.min);
        let partial = (count / self.width * (v as f64 - lower)).clamp(0.0, count);

        ((before as f64 + partial) / self.ntups as f64).clamp(0.0, 1.0)
    }

    /// Average selectivity across all buckets.
    ///
    /// Every recorded value lands in exactly one bucket, so this is 1.0 once
    /// anything has been recorded and 0.0 for an empty histogram.
    pub fn avg_selectivity(&self) -> f64 {
        if self.ntups == 0 {
            return 0.0;
        }
        let total: u64 = self.buckets.iter().sum();
        total as f64 / self.ntups as f64
    }
}

impl fmt::Display for IntHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IntHistogram(min={}, max={}, buckets={}, width={:.3}, ntups={}) [",
            self.min,
            self.max,
            self.buckets.len(),
            self.width,
            self.ntups
        )?;
        for (i, count) in self.buckets.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", count)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn uniform(buckets: usize, min: i32, max: i32, values: std::ops::Range<i32>) -> IntHistogram {
        let mut h = IntHistogram::new(buckets, min, max).unwrap();
        for v in values {
            h.add_value(v);
        }
        h
    }

    #[test]
    fn test_new_validates_arguments() {
        assert!(matches!(
            IntHistogram::new(0, 0, 10),
            Err(StatsError::InvalidBucketCount(0))
        ));
        assert!(matches!(
            IntHistogram::new(4, 10, 0),
            Err(StatsError::InvalidRange { min: 10, max: 0 })
        ));
        let h = IntHistogram::new(1, 5, 5).unwrap();
        assert_eq!(h.width(), 1.0);
    }

    #[test]
    fn test_bucket_index() {
        let h = IntHistogram::new(10, 0, 99).unwrap();
        assert_eq!(h.bucket_index(0).unwrap(), 0);
        assert_eq!(h.bucket_index(9).unwrap(), 0);
        assert_eq!(h.bucket_index(10).unwrap(), 1);
        assert_eq!(h.bucket_index(99).unwrap(), 9);
        assert!(matches!(
            h.bucket_index(100),
            Err(StatsError::ValueOutOfRange { value: 100, .. })
        ));
        assert!(h.bucket_index(-1).is_err());
    }

    #[test]
    fn test_max_is_not_recorded() {
        let mut h = IntHistogram::new(10, 0, 100).unwrap();
        h.add_value(100);
        h.add_value(-5);
        h.add_value(250);
        assert_eq!(h.ntups(), 0);
        h.add_value(0);
        h.add_value(99);
        assert_eq!(h.ntups(), 2);
    }

    #[test]
    fn test_extremes() {
        let h = uniform(10, 0, 99, 0..99);
        assert_eq!(h.estimate_selectivity(PredicateOp::LessThan, 0), 0.0);
        assert_eq!(h.estimate_selectivity(PredicateOp::GreaterThanOrEq, 0), 1.0);
        assert_eq!(h.estimate_selectivity(PredicateOp::LessThan, 100), 1.0);
        assert_eq!(h.estimate_selectivity(PredicateOp::LessThan, -50), 0.0);
        assert_eq!(h.estimate_selectivity(PredicateOp::GreaterThan, 1000), 0.0);
    }

    #[test]
    fn test_equals_on_uniform_data() {
        // 90 values spread over [0, 89]; each point holds about 1/100 of the
        // width-1 slices in its bucket.
        let h = uniform(10, 0, 100, 0..90);
        assert_eq!(h.ntups(), 90);
        let eq = h.estimate_selectivity(PredicateOp::Equals, 50);
        assert!((eq - 0.011).abs() < 0.005, "eq = {}", eq);
        let ne = h.estimate_selectivity(PredicateOp::NotEquals, 50);
        assert!((eq + ne - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_range_estimates() {
        let h = uniform(10, 0, 100, 0..100);
        let lt = h.estimate_selectivity(PredicateOp::LessThan, 50);
        assert!((lt - 0.5).abs() < 0.02, "lt = {}", lt);
        let gt = h.estimate_selectivity(PredicateOp::GreaterThan, 50);
        let le = h.estimate_selectivity(PredicateOp::LessThanOrEq, 50);
        assert!((gt + le - 1.0).abs() < EPSILON);
        let ge = h.estimate_selectivity(PredicateOp::GreaterThanOrEq, 50);
        assert!((ge + lt - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_like_is_zero() {
        let h = uniform(4, 0, 10, 0..10);
        assert_eq!(h.estimate_selectivity(PredicateOp::Like, 3), 0.0);
    }

    #[test]
    fn test_empty_histogram() {
        let h = IntHistogram::new(5, 0, 10).unwrap();
        assert_eq!(h.estimate_selectivity(PredicateOp::LessThan, 5), 0.0);
        assert_eq!(h.estimate_selectivity(PredicateOp::Equals, 5), 0.0);
        assert_eq!(h.estimate_selectivity(PredicateOp::GreaterThanOrEq, 5), 1.0);
        assert_eq!(h.avg_selectivity(), 0.0);
    }

    #[test]
    fn test_extreme_range_does_not_overflow() {
        let mut h = IntHistogram::new(16, i32::MIN, i32::MAX).unwrap();
        h.add_value(i32::MIN);
        h.add_value(0);
        h.add_value(i32::MAX - 1);
        assert_eq!(h.ntups(), 3);
        assert_eq!(h.bucket_index(i32::MAX).unwrap(), 15);
        let le = h.estimate_selectivity(PredicateOp::LessThanOrEq, i32::MAX);
        assert_eq!(le, 1.0);
        let eq = h.estimate_selectivity(PredicateOp::Equals, i32::MIN);
        assert!((0.0..=1.0).contains(&eq));
    }

    #[test]
    fn test_avg_selectivity() {
        let h = uniform(3, 0, 30, 0..30);
        assert_eq!(h.avg_selectivity(), 1.0);
    }

    #[test]
    fn test_display() {
        let h = uniform(2, 0, 3, 0..3);
        assert_eq!(
            h.to_string(),
            "IntHistogram(min=0, max=3, buckets=2, width=2.000, ntups=3) [2, 1]"
        );
    }
}

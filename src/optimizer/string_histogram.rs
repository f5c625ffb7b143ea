//! Histogram over text values.

use crate::executor::PredicateOp;

use super::error::StatsError;
use super::histogram::IntHistogram;

/// Number of leading bytes that determine a string's position.
const PREFIX_LEN: usize = 4;

/// Maps `s` to an integer from its first four bytes, most significant first.
///
/// Missing bytes count as zero, so the mapping preserves byte-wise order
/// among strings that differ within their first four bytes.
fn string_to_int(s: &str) -> i64 {
    let mut bytes = [0u8; PREFIX_LEN];
    for (slot, b) in bytes.iter_mut().zip(s.bytes()) {
        *slot = b;
    }
    i64::from(u32::from_be_bytes(bytes))
}

/// Histogram for `Text` columns, backed by an [`IntHistogram`].
///
/// Strings are mapped to integers by [`string_to_int`] and clamped into the
/// range spanned by `""` and `"zzzz"`.
#[derive(Debug, Clone)]
pub struct StringHistogram {
    inner: IntHistogram,
}

impl StringHistogram {
    pub fn new(buckets: usize) -> Result<Self, StatsError> {
        // One past "zzzz" so that the top value is recorded too.
        let inner = IntHistogram::new(buckets, Self::min_value(), Self::max_value() + 1)?;
        Ok(Self { inner })
    }

    fn min_value() -> i32 {
        0
    }

    fn max_value() -> i32 {
        // "zzzz" is 0x7a7a7a7a, which fits in an i32.
        string_to_int("zzzz") as i32
    }

    fn to_int(s: &str) -> i32 {
        let v = string_to_int(s).clamp(
            i64::from(Self::min_value()),
            i64::from(Self::max_value()),
        );
        v as i32
    }

    pub fn add_value(&mut self, s: &str) {
        self.inner.add_value(Self::to_int(s));
    }

    pub fn estimate_selectivity(&self, op: PredicateOp, s: &str) -> f64 {
        self.inner.estimate_selectivity(op, Self::to_int(s))
    }

    pub fn avg_selectivity(&self) -> f64 {
        self.inner.avg_selectivity()
    }

    pub fn ntups(&self) -> u64 {
        self.inner.ntups()
    }
}

//! Property tests for histogram selectivity estimates.

use proptest::prelude::*;

use tupledb::executor::PredicateOp;
use tupledb::optimizer::IntHistogram;

const TOLERANCE: f64 = 1e-9;

fn histogram(buckets: usize, min: i32, span: i32, values: &[i32]) -> IntHistogram {
    let mut h = IntHistogram::new(buckets, min, min + span).unwrap();
    for &v in values {
        h.add_value(min + v.rem_euclid(span + 1));
    }
    h
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn less_than_is_monotonic(
        buckets in 1usize..50,
        min in -1000i32..1000,
        span in 0i32..500,
        values in proptest::collection::vec(any::<i32>(), 0..200),
    ) {
        let h = histogram(buckets, min, span, &values);
        let mut previous = 0.0;
        for v in (min - 5)..=(min + span + 5) {
            let s = h.estimate_selectivity(PredicateOp::LessThan, v);
            prop_assert!((0.0..=1.0).contains(&s));
            prop_assert!(s + TOLERANCE >= previous, "v = {}: {} < {}", v, s, previous);
            previous = s;
        }
    }

    #[test]
    fn complement_laws_hold(
        buckets in 1usize..50,
        min in -1000i32..1000,
        span in 0i32..500,
        values in proptest::collection::vec(any::<i32>(), 1..200),
        probe in -1100i32..1600,
    ) {
        let h = histogram(buckets, min, span, &values);
        let gt = h.estimate_selectivity(PredicateOp::GreaterThan, probe);
        let le = h.estimate_selectivity(PredicateOp::LessThanOrEq, probe);
        prop_assert!((gt + le - 1.0).abs() < TOLERANCE);

        let ge = h.estimate_selectivity(PredicateOp::GreaterThanOrEq, probe);
        let lt = h.estimate_selectivity(PredicateOp::LessThan, probe);
        prop_assert!((ge + lt - 1.0).abs() < TOLERANCE);

        let eq = h.estimate_selectivity(PredicateOp::Equals, probe);
        let ne = h.estimate_selectivity(PredicateOp::NotEquals, probe);
        prop_assert!((eq + ne - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn recorded_values_stay_below_max(
        buckets in 1usize..20,
        span in 0i32..100,
        values in proptest::collection::vec(0i32..200, 0..100),
    ) {
        let mut h = IntHistogram::new(buckets, 0, span).unwrap();
        for &v in &values {
            h.add_value(v);
        }
        let expected = values.iter().filter(|&&v| v < span).count() as u64;
        prop_assert_eq!(h.ntups(), expected);
        if expected > 0 {
            prop_assert_eq!(h.avg_selectivity(), 1.0);
        }
    }
}

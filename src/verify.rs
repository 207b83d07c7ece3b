//! Invariant checks over the metrics and status pipeline.

use crate::benchmark::Benchmark;
use crate::funnel::FunnelCounters;
use crate::metrics::{compute, RateKind};
use crate::status::{classify, ATTENTION_BAND};

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub msg: String,
}

fn violation(msg: String) -> Result<(), InvariantViolation> {
    Err(InvariantViolation { msg })
}

/// Every rate is finite and non-negative, and 0 whenever its denominator is 0.
pub fn assert_rate_invariants(counters: &FunnelCounters) -> Result<(), InvariantViolation> {
    let rates = compute(counters);
    for (kind, value) in rates.iter() {
        if !value.is_finite() || value < 0.0 {
            return violation(format!("{} out of range: {}", kind.key(), value));
        }
        let (_, den) = kind.stages();
        if counters.get(den) == 0 && value != 0.0 {
            return violation(format!("{} not guarded on zero {}", kind.key(), den.key()));
        }
    }
    Ok(())
}

/// Raising the value never lowers the status.
pub fn assert_classify_monotonic(
    lower: f64,
    higher: f64,
    benchmark: &Benchmark,
) -> Result<(), InvariantViolation> {
    if lower > higher {
        return assert_classify_monotonic(higher, lower, benchmark);
    }
    let a = classify(lower, benchmark);
    let b = classify(higher, benchmark);
    if b < a {
        return violation(format!(
            "status fell from {} at {} to {} at {} (min {})",
            a.as_str(),
            lower,
            b.as_str(),
            higher,
            benchmark.min
        ));
    }
    Ok(())
}

/// The floor itself is never critical; the top of the grace band is success.
pub fn assert_classify_boundaries(benchmark: &Benchmark) -> Result<(), InvariantViolation> {
    use crate::status::Status;
    let at_min = classify(benchmark.min, benchmark);
    if at_min == Status::Critical {
        return violation(format!("min {} classified critical", benchmark.min));
    }
    let at_band = classify(benchmark.min * ATTENTION_BAND, benchmark);
    if benchmark.min >= 0.0 && at_band != Status::Success {
        return violation(format!(
            "band edge {} classified {}",
            benchmark.min * ATTENTION_BAND,
            at_band.as_str()
        ));
    }
    Ok(())
}

/// All invariants for one generated case.
pub fn check_case(
    counters: &FunnelCounters,
    benchmark: &Benchmark,
    a: f64,
    b: f64,
) -> Result<(), InvariantViolation> {
    assert_rate_invariants(counters)?;
    assert_classify_monotonic(a, b, benchmark)?;
    assert_classify_boundaries(benchmark)?;
    // the overall rate is the product of the three stages it spans
    let rates = compute(counters);
    let chain = [
        RateKind::ViewToCart,
        RateKind::CartToCheckout,
        RateKind::CheckoutToPurchase,
    ];
    if chain.iter().all(|k| counters.get(k.stages().1) > 0) {
        let product = chain.iter().map(|k| rates.get(*k) / 100.0).product::<f64>() * 100.0;
        let overall = rates.get(RateKind::OverallConversion);
        if (product - overall).abs() > 1e-6 * overall.max(1.0) {
            return violation(format!("overall {} != chained {}", overall, product));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_counters_hold() {
        assert!(assert_rate_invariants(&FunnelCounters::default()).is_ok());
    }

    #[test]
    fn test_monotonic_across_band() {
        let b = Benchmark::floor(70.0);
        let points = [0.0, 69.99, 70.0, 76.99, 77.0, 500.0];
        for w in points.windows(2) {
            assert!(assert_classify_monotonic(w[0], w[1], &b).is_ok());
        }
    }

    #[test]
    fn test_boundaries_for_defaults() {
        for kind in RateKind::ALL {
            let set = crate::benchmark::BenchmarkSet::default();
            assert!(assert_classify_boundaries(set.get(kind)).is_ok());
        }
    }

    #[test]
    fn test_check_case_chain() {
        let c = FunnelCounters::new([1000, 100, 80, 20, 10, 4]);
        assert!(check_case(&c, &Benchmark::floor(1.5), 1.0, 2.0).is_ok());
    }
}

//! End-to-end checks of the counters -> rates -> status pipeline through the
//! public session API.

use funnelboard::benchmark::{Benchmark, BenchmarkSet};
use funnelboard::dashboard::DashboardView;
use funnelboard::format::format_rate;
use funnelboard::funnel::{FunnelCounters, Stage};
use funnelboard::metrics::{compute, RateKind};
use funnelboard::session::{Edit, Session};
use funnelboard::status::{classify, Status, ATTENTION_BAND};
use funnelboard::verify::{assert_classify_monotonic, assert_rate_invariants};

fn session(pairs: &[(Stage, u64)]) -> Session {
    let mut s = Session::default();
    for (stage, v) in pairs {
        s.apply(&Edit::Counter(*stage, v.to_string()));
    }
    s
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_ctr_success() {
    let snap = session(&[(Stage::Impressions, 1000), (Stage::Clicks, 20)]).snapshot();
    assert_eq!(format_rate(snap.rates.click_through), "2,00%");
    assert_eq!(snap.statuses.click_through, Status::Success);
}

#[test]
fn scenario_connect_critical() {
    let snap = session(&[(Stage::Clicks, 100), (Stage::Views, 60)]).snapshot();
    assert_eq!(format_rate(snap.rates.connect), "60,00%");
    assert_eq!(snap.statuses.connect, Status::Critical);
}

#[test]
fn scenario_overall_conversion_success() {
    let snap = session(&[(Stage::Views, 500), (Stage::Purchases, 10)]).snapshot();
    assert_eq!(format_rate(snap.rates.overall_conversion), "2,00%");
    assert_eq!(snap.statuses.overall_conversion, Status::Success);
}

#[test]
fn scenario_all_zero() {
    let snap = Session::default().snapshot();
    for (kind, value) in snap.rates.iter() {
        assert_eq!(format_rate(value), "0,00%", "{}", kind.key());
    }
    assert_eq!(classify(0.0, &Benchmark::floor(1.0)), Status::Critical);
    assert_eq!(snap.statuses.click_through, Status::Critical);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn zero_denominator_always_zero() {
    let counters = FunnelCounters::new([0, 777, 0, 5, 0, 9]);
    let rates = compute(&counters);
    assert_eq!(rates.click_through, 0.0);
    assert_eq!(rates.view_to_cart, 0.0);
    assert_eq!(rates.overall_conversion, 0.0);
    assert_eq!(rates.checkout_to_purchase, 0.0);
    assert!(assert_rate_invariants(&counters).is_ok());
}

#[test]
fn rates_non_negative_over_grid() {
    let values = [0u64, 1, 3, 10, 999, 1_000_000];
    for &a in &values {
        for &b in &values {
            let counters = FunnelCounters::new([a, b, a, b, a, b]);
            assert!(assert_rate_invariants(&counters).is_ok());
        }
    }
}

#[test]
fn classify_is_monotonic() {
    let benchmarks = [
        Benchmark::floor(0.0),
        Benchmark::floor(1.0),
        Benchmark::floor(70.0),
        Benchmark::range(15.0, 20.0),
    ];
    for b in &benchmarks {
        let mut prev = f64::NEG_INFINITY;
        let mut v = -5.0;
        while v < 200.0 {
            if prev.is_finite() {
                assert!(assert_classify_monotonic(prev, v, b).is_ok());
            }
            prev = v;
            v += 0.37;
        }
    }
}

#[test]
fn classify_boundaries() {
    for min in [1.0, 1.5, 15.0, 70.0] {
        let b = Benchmark::floor(min);
        assert_eq!(classify(min, &b), Status::Attention);
        assert_eq!(classify(min * ATTENTION_BAND, &b), Status::Success);
    }
}

#[test]
fn status_ignores_max() {
    let s = session(&[(Stage::Views, 100), (Stage::CartAdditions, 90)]).snapshot();
    // 90% against a 15-20% range is still a success
    assert_eq!(s.statuses.view_to_cart, Status::Success);
}

// ---------------------------------------------------------------------------
// Session behaviour
// ---------------------------------------------------------------------------

#[test]
fn benchmark_edit_reclassifies_without_touching_rates() {
    let mut s = session(&[(Stage::Clicks, 100), (Stage::Views, 60)]);
    let before = s.snapshot();
    s.apply(&Edit::BenchmarkMin(RateKind::Connect, "50".into()));
    let after = s.snapshot();
    assert_eq!(before.rates, after.rates);
    assert_eq!(after.statuses.connect, Status::Success);
    s.apply(&Edit::BenchmarkMin(RateKind::Connect, "58".into()));
    assert_eq!(s.snapshot().statuses.connect, Status::Attention);
}

#[test]
fn purchases_may_exceed_views() {
    let snap = session(&[(Stage::Views, 10), (Stage::Purchases, 25)]).snapshot();
    assert!((snap.rates.overall_conversion - 250.0).abs() < 1e-9);
}

#[test]
fn custom_benchmark_defaults_flow_into_view() {
    let mut set = BenchmarkSet::default();
    set.set_min(RateKind::OverallConversion, 3.0);
    let s = Session::from_query("views=500&purchases=10", set);
    let view = DashboardView::build(&s.snapshot());
    let conv = view.kpis.last().unwrap();
    assert_eq!(conv.status, Status::Critical);
    assert_eq!(conv.benchmark_label, "> 3,00%");
}

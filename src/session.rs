//! Per-viewer session state and the recompute pipeline.
//!
//! The session owns the counters and benchmarks; everything derived from them
//! lives in a [`Snapshot`] that is rebuilt from scratch on every call.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::benchmark::BenchmarkSet;
use crate::funnel::{coerce_benchmark, coerce_counter, FunnelCounters, Stage};
use crate::logging::{log_ignored_param, log_recompute, log_status};
use crate::metrics::{compute, FunnelRates, RateKind};
use crate::status::{classify, Status};

/// Query-string prefix for benchmark minimum parameters.
pub const BENCH_PREFIX: &str = "bench_";

/// A single user edit, carrying the raw text typed into the field.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Counter(Stage, String),
    BenchmarkMin(RateKind, String),
}

impl Edit {
    /// Map a form field name to an edit. `None` for unknown fields.
    pub fn from_param(key: &str, value: &str) -> Option<Edit> {
        if let Some(stage) = Stage::from_key(key) {
            return Some(Edit::Counter(stage, value.to_string()));
        }
        key.strip_prefix(BENCH_PREFIX)
            .and_then(RateKind::from_key)
            .map(|kind| Edit::BenchmarkMin(kind, value.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub counters: FunnelCounters,
    pub benchmarks: BenchmarkSet,
}

impl Session {
    pub fn new(benchmarks: BenchmarkSet) -> Self {
        Self {
            counters: FunnelCounters::default(),
            benchmarks,
        }
    }

    pub fn apply(&mut self, edit: &Edit) {
        match edit {
            Edit::Counter(stage, raw) => self.counters.set(*stage, coerce_counter(raw)),
            Edit::BenchmarkMin(kind, raw) => {
                self.benchmarks.set_min(*kind, coerce_benchmark(raw))
            }
        }
    }

    /// Build a session from `key=value` pairs, starting from `benchmarks`.
    /// Later pairs win over earlier ones; unknown keys are skipped.
    pub fn from_pairs<'a, I>(pairs: I, benchmarks: BenchmarkSet) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut session = Session::new(benchmarks);
        for (key, value) in pairs {
            match Edit::from_param(key, value) {
                Some(edit) => session.apply(&edit),
                None => log_ignored_param(key),
            }
        }
        session
    }

    /// Build a session from a URL query string (without the leading `?`).
    pub fn from_query(query: &str, benchmarks: BenchmarkSet) -> Self {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self::from_pairs(
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            benchmarks,
        )
    }

    /// Recompute every rate and status.
    pub fn snapshot(&self) -> Snapshot {
        let rates = compute(&self.counters);
        let statuses = RateStatuses::classify_all(&rates, &self.benchmarks);
        let snap = Snapshot {
            counters: self.counters,
            rates,
            statuses,
            benchmarks: self.benchmarks,
            fingerprint: fingerprint(&self.counters, &self.benchmarks),
        };
        log_recompute(&snap.fingerprint, &snap.rates);
        snap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateStatuses {
    pub click_through: Status,
    pub connect: Status,
    pub view_to_cart: Status,
    pub cart_to_checkout: Status,
    pub checkout_to_purchase: Status,
    pub overall_conversion: Status,
}

impl RateStatuses {
    fn classify_all(rates: &FunnelRates, benchmarks: &BenchmarkSet) -> Self {
        let status = |kind: RateKind| {
            let value = rates.get(kind);
            let bench = benchmarks.get(kind);
            let s = classify(value, bench);
            log_status(kind, value, bench.min, s);
            s
        };
        Self {
            click_through: status(RateKind::ClickThrough),
            connect: status(RateKind::Connect),
            view_to_cart: status(RateKind::ViewToCart),
            cart_to_checkout: status(RateKind::CartToCheckout),
            checkout_to_purchase: status(RateKind::CheckoutToPurchase),
            overall_conversion: status(RateKind::OverallConversion),
        }
    }

    pub fn get(&self, kind: RateKind) -> Status {
        match kind {
            RateKind::ClickThrough => self.click_through,
            RateKind::Connect => self.connect,
            RateKind::ViewToCart => self.view_to_cart,
            RateKind::CartToCheckout => self.cart_to_checkout,
            RateKind::CheckoutToPurchase => self.checkout_to_purchase,
            RateKind::OverallConversion => self.overall_conversion,
        }
    }
}

/// SHA-256 over the inputs (counters and benchmark floors).
pub fn fingerprint(counters: &FunnelCounters, benchmarks: &BenchmarkSet) -> String {
    let mins: Vec<f64> = RateKind::ALL
        .iter()
        .map(|k| benchmarks.get(*k).min)
        .collect();
    let canonical = serde_json::json!({
        "counters": counters,
        "mins": mins,
    })
    .to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Everything derived from a session at one point in time. The fingerprint
/// is hashed once, when the snapshot is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub counters: FunnelCounters,
    pub rates: FunnelRates,
    pub statuses: RateStatuses,
    pub benchmarks: BenchmarkSet,
    pub fingerprint: String,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "counters": self.counters,
            "rates": self.rates,
            "statuses": self.statuses,
            "benchmarks": self.benchmarks,
            "fingerprint": self.fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::Benchmark;

    #[test]
    fn test_edit_from_param() {
        assert_eq!(
            Edit::from_param("clicks", "20"),
            Some(Edit::Counter(Stage::Clicks, "20".into()))
        );
        assert_eq!(
            Edit::from_param("bench_connect", "75"),
            Some(Edit::BenchmarkMin(RateKind::Connect, "75".into()))
        );
        assert_eq!(Edit::from_param("bench_bogus", "1"), None);
        assert_eq!(Edit::from_param("color", "red"), None);
    }

    #[test]
    fn test_apply_coerces_input() {
        let mut s = Session::default();
        s.apply(&Edit::Counter(Stage::Views, "-3".into()));
        assert_eq!(s.counters.views, 0);
        s.apply(&Edit::Counter(Stage::Views, "12".into()));
        assert_eq!(s.counters.views, 12);
        s.apply(&Edit::BenchmarkMin(RateKind::ClickThrough, "".into()));
        assert_eq!(s.benchmarks.click_through.min, 0.0);
    }

    #[test]
    fn test_snapshot_tracks_edits() {
        let mut s = Session::default();
        s.apply(&Edit::Counter(Stage::Impressions, "1000".into()));
        s.apply(&Edit::Counter(Stage::Clicks, "20".into()));
        let snap = s.snapshot();
        assert!((snap.rates.click_through - 2.0).abs() < 1e-12);
        assert_eq!(snap.statuses.click_through, Status::Success);

        s.apply(&Edit::BenchmarkMin(RateKind::ClickThrough, "2".into()));
        assert_eq!(s.snapshot().statuses.click_through, Status::Attention);
    }

    #[test]
    fn test_from_query() {
        let s = Session::from_query(
            "clicks=100&views=60&bench_connect=70&junk=1",
            BenchmarkSet::default(),
        );
        let snap = s.snapshot();
        assert!((snap.rates.connect - 60.0).abs() < 1e-12);
        assert_eq!(snap.statuses.connect, Status::Critical);
    }

    #[test]
    fn test_from_query_decodes_and_keeps_max() {
        let s = Session::from_query("bench_view_to_cart=12%2E5", BenchmarkSet::default());
        assert_eq!(s.benchmarks.view_to_cart, Benchmark::range(12.5, 20.0));
    }

    #[test]
    fn test_fingerprint_depends_on_inputs() {
        let a = Session::default().snapshot().fingerprint;
        let mut s = Session::default();
        s.apply(&Edit::Counter(Stage::Purchases, "1".into()));
        let b = s.snapshot().fingerprint;
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, Session::default().snapshot().fingerprint);
    }

    #[test]
    fn test_fingerprint_carried_not_rehashed() {
        let mut s = Session::default();
        s.apply(&Edit::Counter(Stage::Clicks, "9".into()));
        let snap = s.snapshot();
        assert_eq!(snap.fingerprint, fingerprint(&s.counters, &s.benchmarks));
        assert_eq!(snap.to_json()["fingerprint"], snap.fingerprint.as_str());
        let view = crate::dashboard::DashboardView::build(&snap);
        assert_eq!(view.fingerprint, snap.fingerprint);
    }
}

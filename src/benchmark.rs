//! Benchmark targets for each rate.
//!
//! A benchmark is a floor (`min`) with an optional display ceiling (`max`).
//! Only `min` affects status; see [`crate::status::classify`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::format_rate;
use crate::metrics::RateKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Benchmark {
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Benchmark {
    pub fn floor(min: f64) -> Self {
        Self { min, max: None }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// KPI card label: `> 1,00%` or `15,00% – 20,00%`.
    pub fn range_label(&self) -> String {
        match self.max {
            Some(max) => format!("{} – {}", format_rate(self.min), format_rate(max)),
            None => format!("> {}", format_rate(self.min)),
        }
    }

    /// Input row "Meta" label: `1,00%` or `15,00% - 20,00%`. A zero ceiling
    /// reads as no ceiling here.
    pub fn target_label(&self) -> String {
        match self.max.filter(|m| *m != 0.0) {
            Some(max) => format!("{} - {}", format_rate(self.min), format_rate(max)),
            None => format_rate(self.min),
        }
    }
}

/// One benchmark per rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSet {
    pub click_through: Benchmark,
    pub connect: Benchmark,
    pub view_to_cart: Benchmark,
    pub cart_to_checkout: Benchmark,
    pub checkout_to_purchase: Benchmark,
    pub overall_conversion: Benchmark,
}

impl Default for BenchmarkSet {
    fn default() -> Self {
        Self {
            click_through: Benchmark::floor(1.0),
            connect: Benchmark::floor(70.0),
            view_to_cart: Benchmark::range(15.0, 20.0),
            cart_to_checkout: Benchmark::range(20.0, 30.0),
            checkout_to_purchase: Benchmark::range(35.0, 50.0),
            overall_conversion: Benchmark::floor(1.5),
        }
    }
}

/// Partial set read from a benchmarks file. Unknown keys are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BenchmarkOverrides {
    click_through: Option<Benchmark>,
    connect: Option<Benchmark>,
    view_to_cart: Option<Benchmark>,
    cart_to_checkout: Option<Benchmark>,
    checkout_to_purchase: Option<Benchmark>,
    overall_conversion: Option<Benchmark>,
}

impl BenchmarkSet {
    pub fn get(&self, kind: RateKind) -> &Benchmark {
        match kind {
            RateKind::ClickThrough => &self.click_through,
            RateKind::Connect => &self.connect,
            RateKind::ViewToCart => &self.view_to_cart,
            RateKind::CartToCheckout => &self.cart_to_checkout,
            RateKind::CheckoutToPurchase => &self.checkout_to_purchase,
            RateKind::OverallConversion => &self.overall_conversion,
        }
    }

    pub fn get_mut(&mut self, kind: RateKind) -> &mut Benchmark {
        match kind {
            RateKind::ClickThrough => &mut self.click_through,
            RateKind::Connect => &mut self.connect,
            RateKind::ViewToCart => &mut self.view_to_cart,
            RateKind::CartToCheckout => &mut self.cart_to_checkout,
            RateKind::CheckoutToPurchase => &mut self.checkout_to_purchase,
            RateKind::OverallConversion => &mut self.overall_conversion,
        }
    }

    /// Replace the floor, leaving the display ceiling as it was.
    pub fn set_min(&mut self, kind: RateKind, min: f64) {
        self.get_mut(kind).min = min;
    }

    /// Parse a JSON object of overrides keyed by rate key. Rates not named
    /// keep their defaults.
    pub fn from_json(input: &str) -> Result<Self> {
        let overrides: BenchmarkOverrides =
            serde_json::from_str(input).context("invalid benchmarks json")?;
        let mut set = BenchmarkSet::default();
        let pairs = [
            (RateKind::ClickThrough, overrides.click_through),
            (RateKind::Connect, overrides.connect),
            (RateKind::ViewToCart, overrides.view_to_cart),
            (RateKind::CartToCheckout, overrides.cart_to_checkout),
            (RateKind::CheckoutToPurchase, overrides.checkout_to_purchase),
            (RateKind::OverallConversion, overrides.overall_conversion),
        ];
        for (kind, b) in pairs {
            if let Some(b) = b {
                *set.get_mut(kind) = b;
            }
        }
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read benchmarks file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse benchmarks file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = BenchmarkSet::default();
        assert_eq!(set.get(RateKind::ClickThrough).min, 1.0);
        assert_eq!(set.get(RateKind::Connect).min, 70.0);
        assert_eq!(set.get(RateKind::ViewToCart).max, Some(20.0));
        assert_eq!(set.get(RateKind::OverallConversion).min, 1.5);
    }

    #[test]
    fn test_range_label() {
        assert_eq!(Benchmark::floor(1.0).range_label(), "> 1,00%");
        assert_eq!(
            Benchmark::range(15.0, 20.0).range_label(),
            "15,00% – 20,00%"
        );
    }

    #[test]
    fn test_target_label() {
        assert_eq!(Benchmark::floor(70.0).target_label(), "70,00%");
        assert_eq!(
            Benchmark::range(35.0, 50.0).target_label(),
            "35,00% - 50,00%"
        );
        assert_eq!(Benchmark::range(5.0, 0.0).target_label(), "5,00%");
    }

    #[test]
    fn test_set_min_keeps_max() {
        let mut set = BenchmarkSet::default();
        set.set_min(RateKind::CartToCheckout, 25.5);
        assert_eq!(*set.get(RateKind::CartToCheckout), Benchmark::range(25.5, 30.0));
    }

    #[test]
    fn test_from_json_partial() {
        let set = BenchmarkSet::from_json(r#"{"connect": {"min": 80}}"#).unwrap();
        assert_eq!(set.connect, Benchmark::floor(80.0));
        assert_eq!(set.click_through, Benchmark::floor(1.0));
    }

    #[test]
    fn test_from_json_rejects_unknown_rate() {
        assert!(BenchmarkSet::from_json(r#"{"bounce": {"min": 1}}"#).is_err());
    }
}

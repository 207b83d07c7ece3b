//! Funnel stages and the raw counters entered for them.

use serde::{Deserialize, Serialize};

/// One step of the acquisition funnel, in funnel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Impressions,
    Clicks,
    Views,
    CartAdditions,
    CheckoutStarts,
    Purchases,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Impressions,
        Stage::Clicks,
        Stage::Views,
        Stage::CartAdditions,
        Stage::CheckoutStarts,
        Stage::Purchases,
    ];

    /// Identifier used in query strings and JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Impressions => "impressions",
            Stage::Clicks => "clicks",
            Stage::Views => "views",
            Stage::CartAdditions => "cart_additions",
            Stage::CheckoutStarts => "checkout_starts",
            Stage::Purchases => "purchases",
        }
    }

    pub fn from_key(key: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Impressions => "Impressões",
            Stage::Clicks => "Cliques",
            Stage::Views => "Visualizações",
            Stage::CartAdditions => "Add. Carrinho",
            Stage::CheckoutStarts => "Checkout",
            Stage::Purchases => "Compras",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            Stage::Impressions => "Quantidade total de vezes que seus anúncios foram exibidos.",
            Stage::Clicks => "Número de vezes que usuários clicaram no seu anúncio.",
            Stage::Views => "Número de visitas qualificadas que carregaram a página.",
            Stage::CartAdditions => "Número de usuários que adicionaram um produto ao carrinho.",
            Stage::CheckoutStarts => "Número de usuários que iniciaram o processo de pagamento.",
            Stage::Purchases => "Porcentagem de sessões que resultaram em uma venda real.",
        }
    }

    /// Bar width in percent. Fixed by position so the funnel keeps its shape
    /// regardless of the entered values.
    pub fn bar_width_pct(&self) -> u8 {
        100 - 10 * self.index() as u8
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }
}

/// The six user-entered counters. No ordering is enforced between them:
/// purchases may exceed views and the rates simply reflect that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounters {
    pub impressions: u64,
    pub clicks: u64,
    pub views: u64,
    pub cart_additions: u64,
    pub checkout_starts: u64,
    pub purchases: u64,
}

impl FunnelCounters {
    pub fn new(values: [u64; 6]) -> Self {
        let [impressions, clicks, views, cart_additions, checkout_starts, purchases] = values;
        Self {
            impressions,
            clicks,
            views,
            cart_additions,
            checkout_starts,
            purchases,
        }
    }

    pub fn get(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Impressions => self.impressions,
            Stage::Clicks => self.clicks,
            Stage::Views => self.views,
            Stage::CartAdditions => self.cart_additions,
            Stage::CheckoutStarts => self.checkout_starts,
            Stage::Purchases => self.purchases,
        }
    }

    pub fn set(&mut self, stage: Stage, value: u64) {
        let slot = match stage {
            Stage::Impressions => &mut self.impressions,
            Stage::Clicks => &mut self.clicks,
            Stage::Views => &mut self.views,
            Stage::CartAdditions => &mut self.cart_additions,
            Stage::CheckoutStarts => &mut self.checkout_starts,
            Stage::Purchases => &mut self.purchases,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, u64)> + '_ {
        Stage::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Coerce raw counter input. Empty, non-numeric, NaN and negative input all
/// become 0; fractions are floored; oversized values saturate.
pub fn coerce_counter(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() || v <= 0.0 => 0,
        Ok(v) if v >= u64::MAX as f64 => u64::MAX,
        Ok(v) => v.floor() as u64,
        Err(_) => 0,
    }
}

/// Coerce raw benchmark input. The range is unconstrained, but anything that
/// does not parse to a finite number becomes 0.
pub fn coerce_benchmark(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

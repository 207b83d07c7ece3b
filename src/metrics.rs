//! Derived conversion rates.
//!
//! Every rate is `numerator / denominator * 100` over two counters, with a
//! zero denominator yielding 0. Rates are recomputed from scratch on each
//! call; nothing is cached.

use serde::{Deserialize, Serialize};

use crate::funnel::{FunnelCounters, Stage};

/// The six rates shown on the dashboard. Five are sequential transitions
/// between adjacent stages; `OverallConversion` spans views to purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    ClickThrough,
    Connect,
    ViewToCart,
    CartToCheckout,
    CheckoutToPurchase,
    OverallConversion,
}

impl RateKind {
    pub const ALL: [RateKind; 6] = [
        RateKind::ClickThrough,
        RateKind::Connect,
        RateKind::ViewToCart,
        RateKind::CartToCheckout,
        RateKind::CheckoutToPurchase,
        RateKind::OverallConversion,
    ];

    pub const TRANSITIONS: [RateKind; 5] = [
        RateKind::ClickThrough,
        RateKind::Connect,
        RateKind::ViewToCart,
        RateKind::CartToCheckout,
        RateKind::CheckoutToPurchase,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RateKind::ClickThrough => "click_through",
            RateKind::Connect => "connect",
            RateKind::ViewToCart => "view_to_cart",
            RateKind::CartToCheckout => "cart_to_checkout",
            RateKind::CheckoutToPurchase => "checkout_to_purchase",
            RateKind::OverallConversion => "overall_conversion",
        }
    }

    pub fn from_key(key: &str) -> Option<RateKind> {
        RateKind::ALL.into_iter().find(|k| k.key() == key)
    }

    /// (numerator, denominator)
    pub fn stages(&self) -> (Stage, Stage) {
        match self {
            RateKind::ClickThrough => (Stage::Clicks, Stage::Impressions),
            RateKind::Connect => (Stage::Views, Stage::Clicks),
            RateKind::ViewToCart => (Stage::CartAdditions, Stage::Views),
            RateKind::CartToCheckout => (Stage::CheckoutStarts, Stage::CartAdditions),
            RateKind::CheckoutToPurchase => (Stage::Purchases, Stage::CheckoutStarts),
            RateKind::OverallConversion => (Stage::Purchases, Stage::Views),
        }
    }

    /// The transition rate that leads into `stage`, if any.
    pub fn transition_into(stage: Stage) -> Option<RateKind> {
        RateKind::TRANSITIONS
            .into_iter()
            .find(|k| k.stages().0 == stage)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RateKind::ClickThrough => "CTR",
            RateKind::Connect => "Connect Rate",
            RateKind::ViewToCart => "Add Carrinho",
            RateKind::CartToCheckout => "Checkout",
            RateKind::CheckoutToPurchase => "Taxa Compra",
            RateKind::OverallConversion => "Taxa de Conversão",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            RateKind::ClickThrough => {
                "Taxa de Cliques (CTR): Porcentagem de impressões que geraram um clique."
            }
            RateKind::Connect => {
                "Connect Rate: Porcentagem de cliques que efetivamente carregaram o site."
            }
            RateKind::ViewToCart => {
                "Taxa de Adição: Visitantes que colocaram produtos no carrinho."
            }
            RateKind::CartToCheckout => {
                "Taxa de Checkout: Usuários com carrinho que iniciaram o pagamento."
            }
            RateKind::CheckoutToPurchase => {
                "Taxa de Conversão de Checkout: Pagamentos iniciados que foram concluídos."
            }
            RateKind::OverallConversion => {
                "Porcentagem de sessões que resultaram em uma venda real."
            }
        }
    }
}

/// Percentage of `numerator` over `denominator`, 0 when the denominator is 0.
pub fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelRates {
    pub click_through: f64,
    pub connect: f64,
    pub view_to_cart: f64,
    pub cart_to_checkout: f64,
    pub checkout_to_purchase: f64,
    pub overall_conversion: f64,
}

impl FunnelRates {
    pub fn get(&self, kind: RateKind) -> f64 {
        match kind {
            RateKind::ClickThrough => self.click_through,
            RateKind::Connect => self.connect,
            RateKind::ViewToCart => self.view_to_cart,
            RateKind::CartToCheckout => self.cart_to_checkout,
            RateKind::CheckoutToPurchase => self.checkout_to_purchase,
            RateKind::OverallConversion => self.overall_conversion,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RateKind, f64)> + '_ {
        RateKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

fn rate_of(counters: &FunnelCounters, kind: RateKind) -> f64 {
    let (num, den) = kind.stages();
    rate(counters.get(num), counters.get(den))
}

/// Derive all six rates from the counters.
pub fn compute(counters: &FunnelCounters) -> FunnelRates {
    FunnelRates {
        click_through: rate_of(counters, RateKind::ClickThrough),
        connect: rate_of(counters, RateKind::Connect),
        view_to_cart: rate_of(counters, RateKind::ViewToCart),
        cart_to_checkout: rate_of(counters, RateKind::CartToCheckout),
        checkout_to_purchase: rate_of(counters, RateKind::CheckoutToPurchase),
        overall_conversion: rate_of(counters, RateKind::OverallConversion),
    }
}

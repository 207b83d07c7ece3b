//! Three-column view model: inputs, funnel bars, KPI cards.

use serde::Serialize;

use crate::format::{format_raw, format_rate};
use crate::funnel::Stage;
use crate::metrics::RateKind;
use crate::session::{Snapshot, BENCH_PREFIX};
use crate::status::{Status, ACCENT_COLOR};

pub const TITLE: &str = "Funil de Jornada do Cliente";

/// Rates promoted to KPI cards, in display order.
pub const KPI_RATES: [RateKind; 3] = [
    RateKind::ClickThrough,
    RateKind::Connect,
    RateKind::OverallConversion,
];

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkInput {
    pub field: String,
    pub min: f64,
    pub target_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputRow {
    pub field: &'static str,
    pub label: &'static str,
    pub tooltip: &'static str,
    pub value: u64,
    pub benchmark: Option<BenchmarkInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Connector {
    pub rate_label: &'static str,
    pub value: String,
    pub status: Status,
    pub color: &'static str,
    pub tooltip: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelBar {
    pub label: &'static str,
    pub count: String,
    pub width_pct: u8,
    pub color: &'static str,
    /// Badge between this bar and the next one, showing the next stage's
    /// incoming rate.
    pub connector: Option<Connector>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiCard {
    pub label: &'static str,
    pub tooltip: &'static str,
    pub value: String,
    pub status: Status,
    pub color: &'static str,
    pub benchmark_label: String,
    /// Editable floor for rates that have no input row of their own, so
    /// every benchmark survives a form submit.
    pub benchmark_input: Option<BenchmarkInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub inputs: Vec<InputRow>,
    pub bars: Vec<FunnelBar>,
    pub kpis: Vec<KpiCard>,
    pub fingerprint: String,
}

fn kpi_label(kind: RateKind) -> &'static str {
    match kind {
        RateKind::ClickThrough => "Taxa de Cliques (CTR)",
        other => other.label(),
    }
}

fn kpi_tooltip(kind: RateKind) -> &'static str {
    match kind {
        RateKind::ClickThrough => {
            "Porcentagem de impressões que resultaram em um clique (Cliques ÷ Impressões)."
        }
        RateKind::Connect => {
            "Porcentagem de cliques que aguardaram o carregamento do site (Sessões ÷ Cliques)."
        }
        other => other.tooltip(),
    }
}

fn connector_for(snap: &Snapshot, stage: Stage) -> Option<Connector> {
    let kind = RateKind::transition_into(stage)?;
    let status = snap.statuses.get(kind);
    Some(Connector {
        rate_label: kind.label(),
        value: format_rate(snap.rates.get(kind)),
        status,
        color: status.color(),
        tooltip: kind.tooltip(),
    })
}

fn bench_input(snap: &Snapshot, kind: RateKind) -> BenchmarkInput {
    let b = snap.benchmarks.get(kind);
    BenchmarkInput {
        field: format!("{}{}", BENCH_PREFIX, kind.key()),
        min: b.min,
        target_label: b.target_label(),
    }
}

impl DashboardView {
    pub fn build(snap: &Snapshot) -> Self {
        let inputs = Stage::ALL
            .iter()
            .map(|&stage| InputRow {
                field: stage.key(),
                label: stage.label(),
                tooltip: stage.tooltip(),
                value: snap.counters.get(stage),
                benchmark: RateKind::transition_into(stage).map(|kind| bench_input(snap, kind)),
            })
            .collect();

        let bars = Stage::ALL
            .iter()
            .map(|&stage| {
                let color = match RateKind::transition_into(stage) {
                    Some(kind) => snap.statuses.get(kind).color(),
                    None => ACCENT_COLOR,
                };
                FunnelBar {
                    label: stage.label(),
                    count: format_raw(snap.counters.get(stage)),
                    width_pct: stage.bar_width_pct(),
                    color,
                    connector: stage.next().and_then(|next| connector_for(snap, next)),
                }
            })
            .collect();

        let kpis = KPI_RATES
            .iter()
            .map(|&kind| {
                let status = snap.statuses.get(kind);
                KpiCard {
                    label: kpi_label(kind),
                    tooltip: kpi_tooltip(kind),
                    value: format_rate(snap.rates.get(kind)),
                    status,
                    color: status.color(),
                    benchmark_label: snap.benchmarks.get(kind).range_label(),
                    benchmark_input: (!RateKind::TRANSITIONS.contains(&kind))
                        .then(|| bench_input(snap, kind)),
                }
            })
            .collect();

        Self {
            title: TITLE,
            inputs,
            bars,
            kpis,
            fingerprint: snap.fingerprint.clone(),
        }
    }
}

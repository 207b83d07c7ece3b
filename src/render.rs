//! HTML page and plain-text report rendering of a [`DashboardView`].

use std::fmt::Write;

use crate::dashboard::DashboardView;
use crate::status::ACCENT_COLOR;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render a number for an `<input value>` without trailing `.0`.
fn input_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn tip(text: &str) -> String {
    format!(
        r#"<span class="tip" tabindex="0">?<span class="tip-text">{}</span></span>"#,
        escape_html(text)
    )
}

fn inputs_column(view: &DashboardView, out: &mut String) {
    out.push_str(r#"<section class="col col-inputs">"#);
    for row in &view.inputs {
        out.push_str(r#"<div class="input-group">"#);
        if let Some(b) = &row.benchmark {
            let _ = write!(
                out,
                r#"<div class="meta">Meta: <span>{}</span> <input class="bench" type="number" step="0.1" name="{}" value="{}" aria-label="Meta {}"></div>"#,
                escape_html(&b.target_label),
                escape_html(&b.field),
                input_number(b.min),
                escape_html(row.label),
            );
        }
        let _ = write!(
            out,
            r#"<label class="input-row"><span class="input-label">{}</span>{}<input type="number" min="0" name="{}" value="{}"></label>"#,
            escape_html(row.label),
            tip(row.tooltip),
            row.field,
            row.value,
        );
        out.push_str("</div>");
    }
    out.push_str(r#"<button type="submit">Calcular</button></section>"#);
}

fn funnel_column(view: &DashboardView, out: &mut String) {
    out.push_str(r#"<section class="col col-funnel">"#);
    for bar in &view.bars {
        let dark_text = bar.color == ACCENT_COLOR;
        let _ = write!(
            out,
            r#"<div class="step"><div class="bar{}" style="width:{}%;background:{};"><span class="count">{}</span><span class="bar-label">{}</span></div>"#,
            if dark_text { " bar-dark" } else { "" },
            bar.width_pct,
            bar.color,
            escape_html(&bar.count),
            escape_html(bar.label),
        );
        if let Some(c) = &bar.connector {
            let _ = write!(
                out,
                r#"<div class="connector"><span class="rate {}" style="color:{};border-color:{};" title="{}">{}</span>{}</div>"#,
                c.status.as_str(),
                c.color,
                c.color,
                escape_html(c.rate_label),
                escape_html(&c.value),
                tip(c.tooltip),
            );
        }
        out.push_str("</div>");
    }
    out.push_str("</section>");
}

fn kpi_column(view: &DashboardView, out: &mut String) {
    out.push_str(r#"<section class="col col-kpis">"#);
    for kpi in &view.kpis {
        let bench = match &kpi.benchmark_input {
            Some(b) => format!(
                r#" <input class="bench" type="number" step="0.1" name="{}" value="{}" aria-label="Meta {}">"#,
                escape_html(&b.field),
                input_number(b.min),
                escape_html(kpi.label),
            ),
            None => String::new(),
        };
        let _ = write!(
            out,
            r#"<div class="kpi {}" style="border-color:{};"><h3>{}{}</h3><div class="kpi-value" style="color:{};">{}</div><div class="kpi-meta">Meta: <b>{}</b>{}</div></div>"#,
            kpi.status.as_str(),
            kpi.color,
            escape_html(kpi.label),
            tip(kpi.tooltip),
            kpi.color,
            escape_html(&kpi.value),
            escape_html(&kpi.benchmark_label),
            bench,
        );
    }
    out.push_str("</section>");
}

/// Self-contained HTML document. The inputs form submits back to `/` with a
/// GET, so each edit produces a fresh, fully recomputed page.
pub fn html(view: &DashboardView) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str(HEAD);
    let _ = write!(
        out,
        r#"<header><h1>{}</h1></header><form method="get" action="/"><main>"#,
        escape_html(view.title)
    );
    inputs_column(view, &mut out);
    funnel_column(view, &mut out);
    kpi_column(view, &mut out);
    let _ = write!(
        out,
        r#"</main></form><footer class="mono">{}</footer></body></html>"#,
        &view.fingerprint[..view.fingerprint.len().min(12)]
    );
    out
}

/// Aligned plain-text report.
pub fn text(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "{}", "=".repeat(view.title.chars().count()));
    let _ = writeln!(out);
    for (row, bar) in view.inputs.iter().zip(&view.bars) {
        let _ = write!(out, "{:<16}{:>16}", row.label, bar.count);
        match &row.benchmark {
            Some(b) => {
                let _ = writeln!(out, "   meta {}", b.target_label);
            }
            None => {
                let _ = writeln!(out);
            }
        }
        if let Some(c) = &bar.connector {
            let _ = writeln!(
                out,
                "    -> {:<14}{:>10}  [{}]",
                c.rate_label,
                c.value,
                c.status.as_str()
            );
        }
    }
    let _ = writeln!(out);
    for kpi in &view.kpis {
        let _ = writeln!(
            out,
            "{:<24}{:>10}  [{}]  meta {}",
            kpi.label,
            kpi.value,
            kpi.status.as_str(),
            kpi.benchmark_label
        );
    }
    out
}

/// One-line summary, used in logs and the report tool.
pub fn summary_line(view: &DashboardView) -> String {
    view.kpis
        .iter()
        .map(|k| format!("{}={}", k.label, k.value))
        .collect::<Vec<_>>()
        .join(" ")
}

const HEAD: &str = r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Funil de Jornada do Cliente</title>
  <style>
    :root {
      --bg: #0F1B4E; --bg-raised: #1A275E; --fg: #e2e8f0; --fg-muted: #94a3b8;
      --accent: #FFAA17; --border: rgba(255,255,255,0.08);
      --mono: 'JetBrains Mono', 'Fira Code', 'SF Mono', monospace;
      --sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    }
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: var(--sans); background: var(--bg); color: var(--fg); min-height: 100vh; }
    header { height: 56px; display: flex; align-items: center; justify-content: center; border-bottom: 1px solid var(--border); }
    header h1 { color: var(--accent); font-size: 0.9rem; font-weight: 800; text-transform: uppercase; letter-spacing: -0.01em; }
    main { max-width: 1280px; margin: 0 auto; padding: 2rem; display: grid; grid-template-columns: 3fr 6fr 3fr; gap: 1rem; }
    @media (max-width: 1024px) { main { grid-template-columns: 1fr; padding: 0.5rem; } }
    .col { display: flex; flex-direction: column; justify-content: space-between; gap: 0.75rem; }
    .input-group { display: flex; flex-direction: column; gap: 0.25rem; }
    .meta { text-align: right; font-size: 10px; color: var(--fg-muted); font-family: var(--mono); }
    .meta span { color: var(--fg); }
    .meta .bench, .kpi-meta .bench { width: 4.5rem; margin-left: 0.4rem; }
    .input-row { display: flex; align-items: center; gap: 0.5rem; background: var(--bg-raised); border: 1px solid var(--border); border-radius: 8px; padding: 0.5rem 0.75rem; }
    .input-label { flex: 1; font-size: 11px; font-weight: 700; text-transform: uppercase; letter-spacing: 0.1em; }
    input { width: 5rem; background: var(--bg); border: 1px solid var(--border); border-radius: 4px; color: #fff; font-family: var(--mono); font-weight: 700; text-align: right; padding: 0.2rem 0.4rem; }
    input:focus { outline: none; border-color: var(--accent); }
    button { background: var(--accent); color: var(--bg); border: none; border-radius: 6px; font-weight: 800; padding: 0.5rem; cursor: pointer; }
    .step { display: flex; flex-direction: column; align-items: center; }
    .bar { height: 48px; border-radius: 8px; display: flex; align-items: baseline; justify-content: center; gap: 0.5rem; padding-top: 12px; color: #fff; border: 1px solid rgba(255,255,255,0.1); }
    .bar-dark { color: var(--bg); }
    .count { font-size: 1.1rem; font-weight: 900; }
    .bar-label { font-size: 9px; font-weight: 700; text-transform: uppercase; letter-spacing: 0.1em; opacity: 0.8; }
    .connector { display: flex; align-items: center; gap: 0.25rem; margin: 0.75rem 0; }
    .rate { font-size: 1.25rem; font-weight: 800; padding: 0 0.4rem; border: 1px solid; border-radius: 4px; background: var(--bg); font-variant-numeric: tabular-nums; }
    .kpi { flex: 1; background: var(--bg-raised); border: 1px solid; border-radius: 12px; padding: 1rem; display: flex; flex-direction: column; align-items: center; justify-content: center; text-align: center; }
    .kpi h3 { font-size: 10px; color: var(--fg-muted); text-transform: uppercase; letter-spacing: 0.1em; display: flex; gap: 0.4rem; }
    .kpi-value { font-size: 3rem; font-weight: 900; font-variant-numeric: tabular-nums; }
    .kpi-meta { background: var(--bg); border-radius: 999px; padding: 0.2rem 0.75rem; font-size: 10px; color: var(--fg-muted); }
    .kpi-meta b { color: #fff; font-size: 11px; }
    .tip { position: relative; display: inline-flex; width: 12px; height: 12px; border-radius: 50%; border: 1px solid var(--fg-muted); color: var(--fg-muted); font-size: 8px; align-items: center; justify-content: center; cursor: help; }
    .tip-text { position: absolute; left: 100%; top: 50%; transform: translateY(-50%); margin-left: 0.5rem; background: #0f172a; border: 1px solid #334155; color: #e2e8f0; font-size: 10px; padding: 0.5rem; border-radius: 4px; white-space: nowrap; visibility: hidden; opacity: 0; z-index: 999; pointer-events: none; text-transform: none; letter-spacing: 0; font-weight: 400; }
    .tip:hover .tip-text, .tip:focus .tip-text { visibility: visible; opacity: 1; }
    footer { text-align: center; color: var(--fg-muted); font-size: 10px; padding: 0.5rem; }
    .mono { font-family: var(--mono); }
  </style>
</head>
<body>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn view_from_query(q: &str) -> DashboardView {
        let s = Session::from_query(q, Default::default());
        DashboardView::build(&s.snapshot())
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_input_number() {
        assert_eq!(input_number(70.0), "70");
        assert_eq!(input_number(1.5), "1.5");
        assert_eq!(input_number(-2.0), "-2");
    }

    #[test]
    fn test_html_contains_three_columns() {
        let page = html(&view_from_query("impressions=1000&clicks=20"));
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("Funil de Jornada do Cliente"));
        assert!(page.contains("col-inputs"));
        assert!(page.contains("col-funnel"));
        assert!(page.contains("col-kpis"));
        assert!(page.contains(r#"name="impressions" value="1000""#));
        assert!(page.contains(r#"name="bench_click_through" value="1""#));
        assert!(page.contains("1.000"));
        assert!(page.contains("2,00%"));
        assert!(page.ends_with("</html>"));
    }

    #[test]
    fn test_html_marks_status_classes() {
        let page = html(&view_from_query("clicks=100&views=60"));
        assert!(page.contains(r#"class="rate critical""#));
        assert!(page.contains("60,00%"));
    }

    /// Every `name="..." value="..."` pair inside the form, in document order.
    fn form_fields(page: &str) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        let mut rest = &page[page.find("<form").unwrap()..];
        while let Some(i) = rest.find(" name=\"") {
            rest = &rest[i + 7..];
            let name_end = rest.find('"').unwrap();
            let name = rest[..name_end].to_string();
            let tail = &rest[name_end..];
            let v = tail.find(" value=\"").unwrap() + 8;
            let value_end = tail[v..].find('"').unwrap();
            fields.push((name, tail[v..v + value_end].to_string()));
            rest = &tail[v + value_end..];
        }
        fields
    }

    #[test]
    fn test_overall_benchmark_is_editable() {
        let page = html(&view_from_query(""));
        assert!(page.contains(r#"name="bench_overall_conversion" value="1.5""#));
    }

    #[test]
    fn test_form_resubmit_preserves_session() {
        let q = "impressions=1000&clicks=20&views=15&bench_overall_conversion=3&bench_connect=65.5";
        let first = Session::from_query(q, Default::default());
        let page = html(&DashboardView::build(&first.snapshot()));
        let fields = form_fields(&page);
        assert!(fields
            .iter()
            .any(|(k, v)| k == "bench_overall_conversion" && v == "3"));
        let second = Session::from_pairs(
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            Default::default(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_report() {
        let report = text(&view_from_query("views=500&purchases=10"));
        assert!(report.contains("Taxa de Conversão"));
        assert!(report.contains("2,00%  [success]  meta > 1,50%"));
        assert!(report.contains("Visualizações"));
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&view_from_query(""));
        assert_eq!(
            line,
            "Taxa de Cliques (CTR)=0,00% Connect Rate=0,00% Taxa de Conversão=0,00%"
        );
    }
}

//! Funnel report: computes rates from `key=value` arguments and prints a
//! text report, the JSON snapshot, or writes a static HTML page.
//!
//! Run with: cargo run --bin report -- impressions=1000 clicks=20 views=15

use std::fs;

use anyhow::{bail, Context, Result};

use funnelboard::config::Config;
use funnelboard::dashboard::DashboardView;
use funnelboard::logging::{log, obj, v_str, Domain, Level};
use funnelboard::render;
use funnelboard::session::Session;

fn usage() {
    println!("Funnel report - conversion rates from raw funnel counters\n");
    println!("Usage: report [text|json|html <out.html>] key=value...\n");
    println!("Counter keys:   impressions clicks views cart_additions checkout_starts purchases");
    println!("Benchmark keys: bench_click_through bench_connect bench_view_to_cart");
    println!("                bench_cart_to_checkout bench_checkout_to_purchase bench_overall_conversion");
    println!("\nExamples:");
    println!("  report impressions=1000 clicks=20");
    println!("  report json views=500 purchases=10");
    println!("  report html out/funnel.html clicks=100 views=60 bench_connect=65");
}

/// Split arguments into mode, output path (html only) and `key=value` pairs.
fn parse_args(args: &[String]) -> Result<(&str, Option<&str>, Vec<(&str, &str)>)> {
    let (mode, rest) = match args.first().map(String::as_str) {
        Some(m @ ("text" | "json")) => (m, &args[1..]),
        Some("html") => {
            if args.len() < 2 {
                bail!("usage: report html <out.html> key=value...");
            }
            ("html", &args[1..])
        }
        _ => ("text", args),
    };
    let (out_path, pairs) = if mode == "html" {
        (Some(rest[0].as_str()), &rest[1..])
    } else {
        (None, rest)
    };

    let pairs = pairs
        .iter()
        .filter_map(|a| match a.split_once('=') {
            Some(kv) => Some(kv),
            None => {
                eprintln!("ignoring argument without '=': {}", a);
                None
            }
        })
        .collect();
    Ok((mode, out_path, pairs))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        usage();
        return Ok(());
    }

    let (mode, out_path, pairs) = parse_args(&args)?;

    let cfg = Config::from_env();
    let session = Session::from_pairs(pairs, cfg.benchmarks()?);
    let snap = session.snapshot();
    let view = DashboardView::build(&snap);

    match (mode, out_path) {
        ("json", _) => println!("{}", serde_json::to_string_pretty(&snap.to_json())?),
        ("html", Some(path)) => {
            let page = render::html(&view);
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
            }
            fs::write(path, &page).with_context(|| format!("failed to write {}", path))?;
            log(
                Level::Info,
                Domain::Render,
                "html_written",
                obj(&[
                    ("path", v_str(path)),
                    ("summary", v_str(&render::summary_line(&view))),
                ]),
            );
            println!("  {} written ({:.1} KB)", path, page.len() as f64 / 1024.0);
        }
        _ => print!("{}", render::text(&view)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_html_without_path_fails() {
        let err = parse_args(&args(&["html"])).unwrap_err();
        assert!(err.to_string().contains("report html <out.html>"));
    }

    #[test]
    fn test_parse_modes() {
        let a = args(&["html", "out/f.html", "clicks=5"]);
        let (mode, out, pairs) = parse_args(&a).unwrap();
        assert_eq!((mode, out), ("html", Some("out/f.html")));
        assert_eq!(pairs, vec![("clicks", "5")]);

        let a = args(&["impressions=10", "stray"]);
        let (mode, out, pairs) = parse_args(&a).unwrap();
        assert_eq!((mode, out), ("text", None));
        assert_eq!(pairs, vec![("impressions", "10")]);

        let a = args(&["json"]);
        assert_eq!(parse_args(&a).unwrap().0, "json");
    }
}

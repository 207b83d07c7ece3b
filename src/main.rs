use anyhow::{Context, Result};
use serde_json::json;
use tokio::net::TcpListener;

use funnelboard::config::Config;
use funnelboard::logging::{log, obj, v_str, Domain, Level};
use funnelboard::server::{serve, ServerState};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let benchmarks = cfg.benchmarks()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("addr", v_str(&cfg.listen_addr())),
            (
                "benchmarks_path",
                cfg.benchmarks_path
                    .as_ref()
                    .map(|p| v_str(&p.to_string_lossy()))
                    .unwrap_or(serde_json::Value::Null),
            ),
            ("benchmarks", json!(benchmarks)),
        ]),
    );

    let listener = TcpListener::bind(cfg.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr()))?;
    println!("Funnel dashboard running at http://{}", listener.local_addr()?);

    serve(
        listener,
        ServerState {
            benchmarks,
            max_request_bytes: cfg.max_request_bytes,
        },
    )
    .await
}

use std::path::PathBuf;

use anyhow::Result;

use crate::benchmark::BenchmarkSet;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Optional JSON file overriding the default benchmarks
    pub benchmarks_path: Option<PathBuf>,
    /// Request head larger than this is rejected
    pub max_request_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8766),
            benchmarks_path: std::env::var("BENCHMARKS_PATH").ok().filter(|v| !v.is_empty()).map(PathBuf::from),
            max_request_bytes: std::env::var("MAX_REQUEST_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(8192),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Defaults, overridden by the benchmarks file when one is configured.
    pub fn benchmarks(&self) -> Result<BenchmarkSet> {
        match &self.benchmarks_path {
            Some(path) => BenchmarkSet::load(path),
            None => Ok(BenchmarkSet::default()),
        }
    }
}

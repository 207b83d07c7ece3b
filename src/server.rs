//! Minimal HTTP front end for the dashboard.
//!
//! Each request carries the whole session in its query string, so handlers
//! share nothing but the configured benchmark defaults.
//!
//! Endpoints:
//!   GET /            - HTML dashboard
//!   GET /api/metrics - snapshot as JSON
//!   GET /api/health  - health check

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::benchmark::BenchmarkSet;
use crate::dashboard::DashboardView;
use crate::logging::{log, log_request, obj, v_str, Domain, Level, ProfileScope};
use crate::render;
use crate::session::Session;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.to_string())
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            431 => "Request Header Fields Too Large",
            _ => "Internal Server Error",
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Cache-Control: no-store\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct ServerState {
    pub benchmarks: BenchmarkSet,
    pub max_request_bytes: usize,
}

/// Split a request target into path and query.
fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

/// Route one request line (`GET /path?query HTTP/1.1`).
pub fn route(request_line: &str, benchmarks: &BenchmarkSet) -> Response {
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m, t),
        _ => return Response::text(400, "Bad Request"),
    };
    if method != "GET" {
        return Response::text(405, "Method Not Allowed");
    }
    let (path, query) = split_target(target);
    match path {
        "/" | "/index.html" => {
            let _scope = ProfileScope::new("render_html");
            let snap = Session::from_query(query, *benchmarks).snapshot();
            let view = DashboardView::build(&snap);
            Response::new(200, "text/html; charset=utf-8", render::html(&view))
        }
        "/api/metrics" => {
            let snap = Session::from_query(query, *benchmarks).snapshot();
            Response::new(200, "application/json", snap.to_json().to_string())
        }
        "/api/health" => Response::new(200, "application/json", json!({"status": "ok"}).to_string()),
        _ => Response::text(404, "Not Found"),
    }
}

/// Read the request head, up to the blank line or `limit` bytes.
async fn read_head(stream: &mut TcpStream, limit: usize) -> Result<Option<String>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.context("read request")?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if buf.len() > limit {
            return Ok(None);
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

async fn handle(mut stream: TcpStream, state: Arc<ServerState>) -> Result<()> {
    let scope = ProfileScope::new("request");
    let response = match timeout(READ_TIMEOUT, read_head(&mut stream, state.max_request_bytes)).await {
        Err(_) => Response::text(408, "Request Timeout"),
        Ok(Err(err)) => return Err(err),
        Ok(Ok(None)) => Response::text(431, "Request Too Large"),
        Ok(Ok(Some(head))) => {
            let line = head.lines().next().unwrap_or_default().to_string();
            let resp = route(&line, &state.benchmarks);
            let mut parts = line.split_whitespace();
            let method = parts.next().unwrap_or("-");
            let path = parts.next().map(|t| split_target(t).0).unwrap_or("-");
            log_request(method, path, resp.status, scope.elapsed_ms());
            resp
        }
    };
    stream
        .write_all(&response.to_bytes())
        .await
        .context("write response")?;
    stream.shutdown().await.ok();
    Ok(())
}

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, state: ServerState) -> Result<()> {
    let state = Arc::new(state);
    if let Ok(addr) = listener.local_addr() {
        log(
            Level::Info,
            Domain::Server,
            "listening",
            obj(&[("addr", v_str(&addr.to_string()))]),
        );
    }
    loop {
        let (stream, peer) = listener.accept().await.context("accept")?;
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = handle(stream, state).await {
                log(
                    Level::Warn,
                    Domain::Server,
                    "connection_error",
                    obj(&[
                        ("peer", v_str(&peer.to_string())),
                        ("error", v_str(&format!("{:#}", err))),
                    ]),
                );
            }
        });
    }
}

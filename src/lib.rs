//! Funnel conversion dashboard: six counters in, five transition rates plus
//! an overall conversion rate out, each classified against a benchmark floor.

pub mod benchmark;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod funnel;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod server;
pub mod session;
pub mod status;
pub mod verify;

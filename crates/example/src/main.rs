//! Example particle simulation CLI.
//!
//! # Usage
//!
//! ```bash
//! simulate [ticks] [particles]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=debug simulate 100 32
//! ```

use std::sync::Arc;

use example::{EventLog, SimConfig, TracingLog, simulate};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_TICKS: u64 = 100;

fn main() {
    // RUST_LOG takes precedence; fall back to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
        .ok();

    let args: Vec<String> = std::env::args().collect();
    let ticks = match args.get(1).map(|arg| arg.parse::<u64>()) {
        None => DEFAULT_TICKS,
        Some(Ok(ticks)) => ticks,
        Some(Err(e)) => {
            eprintln!("Error: invalid tick count {:?}: {e}", args[1]);
            eprintln!("Usage: [ticks] [particles]");
            std::process::exit(1);
        }
    };

    let mut config = SimConfig::default();
    if let Some(arg) = args.get(2) {
        config.particles = arg.parse().unwrap_or_else(|e| {
            eprintln!("Error: invalid particle count {arg:?}: {e}");
            std::process::exit(1);
        });
    }

    let log: Arc<dyn EventLog> = Arc::new(TracingLog);
    match simulate(config, ticks, log) {
        Ok(summary) => tracing::info!(
            remaining = summary.remaining,
            escaped = summary.escaped,
            "simulation finished"
        ),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Honour `RUST_LOG` first, the configured level second
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Level configurable via config and environment

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, otherwise `chain_router=<level>`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("chain_router={},tower_http={}", level, level).into())
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod harvester;
pub mod ingest;
pub mod metrics;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router as router, AppState};
pub use crate::config::HarvesterConfig;
pub use crate::harvester::Harvester;
pub use crate::ingest::aggregate::{Aggregator, RunOptions};
pub use crate::ingest::types::{JobRecord, QueryParams, SearchOutcome, Source};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber. `RUST_LOG` wins; `HARVEST_LOG_JSON=1`
/// switches to JSON lines. Safe to call when a subscriber already exists.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("job_harvester=info,warn"));
    let json = std::env::var("HARVEST_LOG_JSON").ok().as_deref() == Some("1");

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Build the full in-process app from the default config sources.
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = HarvesterConfig::load_default()?;
    let harvester = Harvester::from_config(cfg)?;
    let mut state = AppState::new(harvester);
    if let Some(m) = crate::metrics::Metrics::from_env() {
        state = state.with_metrics(m.handle);
    }
    Ok(api::create_router(state))
}

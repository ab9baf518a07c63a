//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Every component logs with structured fields (`uid`, `removed`, `size`, ...) so lines can be
//! filtered and aggregated, and the lookup and handler entry points open spans via
//! `#[instrument]`.
//!
//! ## Configuration
//!
//! The level comes from `RUST_LOG` and defaults to `info`. The format is compact and hides
//! the crate/module prefix (`with_target(false)`).
//!
//! ```bash
//! # Compact logs (default)
//! cargo run
//!
//! # Cache hits and misses, parsed events, store requests
//! RUST_LOG=debug cargo run
//!
//! # Only the lookup layer at debug
//! RUST_LOG=info,order_cache::lookup=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Store**: startup and shutdown with record counts, inserts, rejected duplicates
//! - **Cache**: lazy evictions (debug), sweep results with the number removed
//! - **Lookup**: hits and misses (debug), refreshes, store timeouts
//! - **Ingestion**: accepted orders, rejected events with the reason
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Store started record_type="Order" size=3
//! INFO load_from_store: Cache warmed from store loaded=3
//! INFO Sweeper started period_ms=900000
//! INFO Order ingested uid=order_4
//! WARN Order event rejected error=Invalid order: Order has no items bytes=512
//! INFO get_by_id_with_refresh{uid=order_1}: Cache entry refreshed
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

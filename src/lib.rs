//! # Order Cache
//!
//! > **A cache-aside order service with a time-bounded in-memory cache.**
//!
//! Orders arrive as events, are persisted to an authoritative store, and are served to
//! readers from a TTL cache that falls back to the store on a miss.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Cache-aside, not write-through
//! The cache never talks to the store. The [`lookup`] layer decides when to read the store
//! and writes the result back; the [`ingest`] pipeline writes the cache only after the store
//! accepted an order. A crash between the two leaves the cache behind, never ahead.
//!
//! ### One staleness rule
//! An entry is stale once its age exceeds the TTL. Reads hide (and drop) stale entries, the
//! background sweep removes them in batches, and the stats count them, all through the same
//! predicate.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `T`
//! [`TtlCache<T: Record>`](framework::TtlCache) and [`StoreActor<T>`](framework::StoreActor)
//! are written once against the [`Record`](framework::Record) trait; [`Order`](model::Order)
//! is just the first record type plugged in.
//!
//! ### Mocking: Testing without Pain
//! Store behavior (hits, misses, outages, slow answers) is scripted with
//! [`MockStore`](framework::mock::MockStore). See the [`framework::mock`] module.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Concurrency Model
//! Request tasks share one `Arc<OrderCache>` guarded by a single reader/writer lock. The store
//! runs as an actor in its own Tokio task and processes requests sequentially. One sweeper
//! task per cache runs until its [`SweepHandle`](framework::SweepHandle) is closed.
//!
//! ### 2. Cancellation
//! Every store call is bounded by a timeout, and dropping a lookup future cancels it. The cache
//! is written only after a store call returns, so cancellation never leaves partial state.
//!
//! ### 3. Observability
//! We use `tracing` everywhere with structured logging. See the [`lifecycle::tracing`] module.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Generic cache, sweeper, store actor and store trait.
//!
//! ### 2. The Data ([`model`])
//! The order record, its validation, and the `OrderCache` alias.
//!
//! ### 3. The Orchestrator ([`lookup`])
//! Cache-aside reads: plain, refreshing, warm-up, invalidation, stats.
//!
//! ### 4. The Entry Points ([`ingest`], [`handlers`])
//! Event ingestion and transport-neutral request handling.
//!
//! ### 5. The Wiring ([`lifecycle`])
//! Configuration, start-up, graceful shutdown, tracing setup.
//! - **Key items**: [`OrderSystem`](lifecycle::OrderSystem), [`AppConfig`](lifecycle::AppConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```rust,ignore
//! let system = OrderSystem::start(&AppConfig::load()?).await?;
//! system.ingest.publish_order(&Order::sample("order_1")).await?;
//! let response = system.handler().get_order("order_1", false).await;
//! system.shutdown().await?;
//! ```

pub mod framework;
pub mod handlers;
pub mod ingest;
pub mod lifecycle;
pub mod lookup;
pub mod model;

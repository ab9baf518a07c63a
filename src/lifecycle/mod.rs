//! Lifecycle management for the order service.
//!
//! This module handles configuration, start-up and graceful shutdown of every background
//! task, plus the process-wide tracing setup.

pub mod config;
mod order_system;
pub mod tracing;

pub use config::{AppConfig, ConfigError};
pub use order_system::{OrderSystem, SystemError};
pub use self::tracing::setup_tracing;

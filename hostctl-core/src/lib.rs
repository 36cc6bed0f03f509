//! hostctl core - foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other hostctl crates:
//! - Application configuration (endpoint, credentials, job settings)
//! - The `HcError` error type covering every failure category
//! - Structured logging with tracing
//! - Platform directories and common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, StatusPolicy};
pub use error::{HcError, HcResult};
pub use logging::init_logging;
pub use platform::Platform;

//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Admission and queue limits (LimitsConfig)
//! - [`history`]: Session log persistence (HistoryConfig)
//! - [`validation`]: Startup checks

mod history;
mod limits;
mod listen;
mod types;
mod validation;

pub use history::HistoryConfig;
pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, ServerConfig};
pub use validation::{ValidationError, validate};

//! Analytics Configuration Module
//!
//! Tunable cost rates, recommendation thresholds, financial assumptions and
//! forecast limits, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `CARBONWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `carbonwatch.toml` in the current working directory
//! 3. Built-in defaults (see `defaults`)
//!
//! The loaded config is wrapped in an `Arc` and handed to the engine and
//! the service; there is no global accessor.

mod analytics_config;
pub mod defaults;
pub mod validation;

pub use analytics_config::*;

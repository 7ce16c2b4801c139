//! Configuration module for the daily saints service
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every value has a default, so the service also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use daily_saints::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("saints.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.origin.request_timeout_secs);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{CacheConfig, Config, OriginConfig, PipelineConfig, RefreshConfig, ServerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::parse_time_of_day;

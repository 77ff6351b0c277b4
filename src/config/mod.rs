//! Configuration module for Baks
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use baks::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("baks.toml")).unwrap();
//! println!("Body cap: {} bytes", config.fetch.max_body_bytes);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ExtractionPolicy, FetchConfig, ServerConfig, StorageConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config, resolve_database_path};

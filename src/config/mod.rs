//! Configuration module for Sumi-Navigator
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_navigator::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("navigator.toml")).unwrap();
//! println!("Following at most {} redirects", config.navigator.max_redirects);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, NavigatorConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

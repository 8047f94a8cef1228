//! Configuration module for kattrack
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files.
//!
//! # Example
//!
//! ```no_run
//! use kattrack::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Tracking solves for: {}", config.user.full_name);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheConfig, Config, PacingConfig, SiteConfig, UserConfig};

// Re-export parser functions
pub use parser::load_config;

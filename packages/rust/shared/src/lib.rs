//! Shared types, error model, and configuration for roamgraph.
//!
//! This crate is the foundation depended on by all other roamgraph crates.
//! It provides:
//! - [`RoamGraphError`] — the unified error type
//! - Domain types ([`Block`], [`Page`])
//! - Configuration ([`AppConfig`], [`RenderConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GraphConfig, LinksConfig, RenderConfig, RenderSection, config_dir,
    config_file_path, init_config, init_config_at, load_config, load_config_from,
};
pub use error::{Result, RoamGraphError};
pub use types::{Block, Page};

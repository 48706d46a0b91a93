//! Shared types, error model, and configuration for nbdeploy.
//!
//! This crate is the foundation depended on by the other nbdeploy crates.
//! It provides:
//! - [`NbDeployError`] — the unified error type
//! - Domain types ([`Year`], [`TableOfContents`], [`TocSection`], [`TocLink`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConverterConfig, PathsConfig, TocConfig, TocFormat, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_config,
};
pub use error::{NbDeployError, Result};
pub use types::{
    GENERATED_EXTENSION, NOTEBOOK_EXTENSION, TableOfContents, TocLink, TocSection, Year,
};

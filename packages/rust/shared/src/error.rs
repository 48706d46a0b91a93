//! Error types for nbdeploy.
//!
//! Library crates use [`NbDeployError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all nbdeploy operations.
#[derive(Debug, thiserror::Error)]
pub enum NbDeployError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A glob pattern built from a configured directory could not be compiled.
    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// The external converter could not be started at all.
    #[error("failed to start converter `{program}`: {source}")]
    ConverterSpawn {
        program: String,
        source: std::io::Error,
    },

    /// The external converter ran and reported failure.
    #[error("converter `{program}` exited with {}: {stderr}", exit_label(.code))]
    Converter {
        program: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NbDeployError>;

impl NbDeployError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a glob compilation failure with the offending pattern.
    pub fn pattern(pattern: impl Into<String>, err: glob::PatternError) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: err.msg.to_string(),
        }
    }
}

//! Error types for startup-time failures
//!
//! The simulation itself never fails; everything here surfaces before the
//! first frame runs.

use std::path::PathBuf;

use thiserror::Error;

/// Missing or malformed settings. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A sprite or sound that could not be resolved. Never fatal: callers fall
/// back to a placeholder and log once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetLoadError {
    #[error("asset `{name}` has no path configured")]
    NoPath { name: String },
    #[error("asset `{name}` not found at {path}")]
    Missing { name: String, path: PathBuf },
}

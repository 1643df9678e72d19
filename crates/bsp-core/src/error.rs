// ── Core error types ──
//
// Workflow-level failures. Remote rejections keep the underlying
// `bsp_api::Error` so the raw response body stays available for logging.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote ───────────────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] bsp_api::Error),

    #[error("No enterprise unit named '{name}'")]
    EnterpriseUnitNotFound { name: String },

    #[error("{count} enterprise units match '{name}'; expected exactly one")]
    AmbiguousEnterpriseUnit { name: String, count: usize },

    // ── Files ────────────────────────────────────────────────────────
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Required file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    // ── Input ────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("No rows found in {}", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl CoreError {
    /// Raw response body of a remote rejection, if that is what this is.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.response_body(),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

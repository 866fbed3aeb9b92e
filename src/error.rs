//! Error types for variant-bucketing
//!
//! Only registry construction surfaces errors to callers. The assignment and
//! reporting paths degrade instead of failing.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// variant-bucketing error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment definition violates a registry invariant
    #[error("Invalid experiment '{experiment_id}': {reason}\nFix the experiment config; weights are never renormalized")]
    InvalidExperiment {
        /// Offending experiment id
        experiment_id: String,
        /// What is wrong with it
        reason: String,
    },

    /// Same experiment id registered twice
    #[error("Duplicate experiment id: {0}")]
    DuplicateExperiment(String),

    /// Experiment id not present in the registry
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    /// Sink failed to deliver an event
    #[error("Event sink error: {0}")]
    Sink(String),

    /// Channel sink receiver dropped
    #[error("Event channel closed (receiver dropped)")]
    SinkClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON config error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(experiment_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidExperiment {
            experiment_id: experiment_id.to_string(),
            reason: reason.into(),
        }
    }
}

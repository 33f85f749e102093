//! Error types for a dispatch run
//!
//! Errors are classified by scope:
//! - Fatal: configuration and authentication, the run stops before any dispatch
//! - Per item: dispatch send or marker write-back, the item is counted as errored
//!
//! Container fetch failures and payload extraction problems never surface as
//! errors here; they are logged where they happen.

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::google_api::GoogleApiError;

/// Invalid or missing action inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Invalid {name} input: {value:?} is not a non-negative integer")]
    InvalidNumber { name: &'static str, value: String },

    #[error(transparent)]
    InvalidRepository(#[from] DispatchError),

    #[error("No repository input and GITHUB_REPOSITORY is not set")]
    NoRepository,

    #[error("Failed to write step outputs: {0}")]
    Outputs(#[from] std::io::Error),
}

/// Failure that aborts the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Google authentication failed: {0}")]
    Auth(#[from] GoogleApiError),

    #[error("Dispatch client setup failed: {0}")]
    DispatchSetup(#[source] DispatchError),
}

impl RunError {
    /// Get a user-facing recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RunError::Config(ConfigError::Outputs(_)) => {
                "Check that GITHUB_OUTPUT points to a writable file."
            }
            RunError::Config(_) => "Check the step's `with:` inputs.",
            RunError::Auth(GoogleApiError::NoCredentials)
            | RunError::Auth(GoogleApiError::CredentialsNotFound(_))
            | RunError::Auth(GoogleApiError::InvalidCredentials(_)) => {
                "Provide a service account or authorized user key via google-credentials \
                 or GOOGLE_APPLICATION_CREDENTIALS."
            }
            RunError::Auth(GoogleApiError::AuthExpired) => {
                "The refresh token was revoked or expired. Generate new credentials."
            }
            RunError::Auth(_) => {
                "Check the credentials and that the Calendar and Tasks APIs are enabled."
            }
            RunError::DispatchSetup(_) => "Check GITHUB_API_URL.",
        }
    }
}

/// Failure while dispatching or marking a single eligible item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("marker write-back failed: {0}")]
    WriteBack(#[from] GoogleApiError),
}

impl ItemError {
    /// True when the dispatch went out but the marker was not written, so the
    /// next run will dispatch the item again.
    pub fn dispatched_unmarked(&self) -> bool {
        matches!(self, ItemError::WriteBack(_))
    }
}

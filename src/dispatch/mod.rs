//! Outbound `repository_dispatch` events.
//!
//! - payload: the `{ event, custom, source_type }` envelope
//! - github: the GitHub REST sender

pub mod github;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::source::{Item, SourceType};

pub use github::GitHubDispatcher;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid repository format: {0}. Expected owner/repo")]
    InvalidRepository(String),
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Client payload attached to the dispatch event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPayload {
    /// The provider's item, unchanged.
    pub event: Value,
    /// Object parsed from the item's ```json block; empty when absent.
    pub custom: Map<String, Value>,
    pub source_type: SourceType,
}

impl DispatchPayload {
    pub fn for_item(item: &Item, custom: Map<String, Value>) -> Self {
        Self {
            event: item.raw().clone(),
            custom,
            source_type: item.source_type(),
        }
    }
}

/// `owner/repo`, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Owner and repo are the first two `/`-separated segments and must be
    /// non-empty. Anything after a second `/` is ignored.
    pub fn parse(repository: &str) -> Result<Self, DispatchError> {
        let mut segments = repository.split('/');
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(DispatchError::InvalidRepository(repository.to_string())),
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Delivers a dispatch event. No retries: failures go back to the caller as-is.
#[async_trait]
pub trait DispatchSender: Send + Sync {
    async fn send(
        &self,
        repository: &str,
        event_type: &str,
        payload: &DispatchPayload,
    ) -> Result<(), DispatchError>;
}

//! GitHub REST `POST /repos/{owner}/{repo}/dispatches`.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use super::{DispatchError, DispatchPayload, DispatchSender, RepositoryRef};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("calendar-dispatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    event_type: &'a str,
    client_payload: &'a DispatchPayload,
}

/// Sends repository dispatch events with a fixed token.
#[derive(Debug, Clone)]
pub struct GitHubDispatcher {
    http: reqwest::Client,
    token: String,
    api_base: Url,
}

impl GitHubDispatcher {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Result<Self, DispatchError> {
        Self::with_api_base(http, token, GITHUB_API_BASE)
    }

    /// Target a GitHub Enterprise server or a mock.
    pub fn with_api_base(
        http: reqwest::Client,
        token: impl Into<String>,
        api_base: &str,
    ) -> Result<Self, DispatchError> {
        let api_base = Url::parse(api_base)
            .map_err(|e| DispatchError::InvalidBaseUrl(format!("{}: {}", api_base, e)))?;
        Ok(Self {
            http,
            token: token.into(),
            api_base,
        })
    }

    fn dispatches_url(&self, repo: &RepositoryRef) -> Result<Url, DispatchError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| DispatchError::InvalidBaseUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "dispatches"]);
        Ok(url)
    }
}

#[async_trait]
impl DispatchSender for GitHubDispatcher {
    async fn send(
        &self,
        repository: &str,
        event_type: &str,
        payload: &DispatchPayload,
    ) -> Result<(), DispatchError> {
        let repo = RepositoryRef::parse(repository)?;
        let url = self.dispatches_url(&repo)?;

        log::debug!("Sending dispatch to {} with event type: {}", repo, event_type);

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&DispatchRequest {
                event_type,
                client_payload: payload,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DispatchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        log::debug!("Dispatch sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatches_url() {
        let dispatcher = GitHubDispatcher::new(reqwest::Client::new(), "t").unwrap();
        let repo = RepositoryRef::parse("octo/hello").unwrap();
        assert_eq!(
            dispatcher.dispatches_url(&repo).unwrap().as_str(),
            "https://api.github.com/repos/octo/hello/dispatches"
        );
    }

    #[test]
    fn test_enterprise_api_base() {
        let dispatcher = GitHubDispatcher::with_api_base(
            reqwest::Client::new(),
            "t",
            "https://ghe.example.com/api/v3",
        )
        .unwrap();
        let repo = RepositoryRef::parse("octo/hello").unwrap();
        assert_eq!(
            dispatcher.dispatches_url(&repo).unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/octo/hello/dispatches"
        );
    }
}

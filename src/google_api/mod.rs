//! Native Google API client for Calendar v3 and Tasks v1.
//!
//! Direct HTTP via reqwest with a bearer access token obtained from
//! `auth`. Only the calls the dispatch workflow needs are implemented:
//! list items in a time window and patch a single free-text field.
//!
//! Modules:
//! - auth: credential resolution and OAuth2 access tokens
//! - calendar: Google Calendar API v3 (events list/patch)
//! - tasks: Google Tasks API v1 (tasks list/patch)

pub mod auth;
pub mod calendar;
pub mod tasks;

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

/// OAuth2 scopes requested for both credential types.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/tasks",
];

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const TASKS_API_BASE: &str = "https://tasks.googleapis.com/tasks/v1";

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token expired or revoked")]
    AuthExpired,
    #[error(
        "No Google credentials provided. Provide credentials via the google-credentials input \
         or set the GOOGLE_APPLICATION_CREDENTIALS environment variable"
    )]
    NoCredentials,
    #[error("Credentials file not found: {0}")]
    CredentialsNotFound(PathBuf),
    #[error("Invalid credentials format: {0}")]
    InvalidCredentials(String),
    #[error("Token request failed: {0}")]
    RefreshFailed(String),
    #[error("Signing service account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Client
// ============================================================================

/// One page of a Calendar `events.list` or Tasks `tasks.list` response.
///
/// Items stay as raw JSON: they are forwarded unchanged in the dispatch payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    next_page_token: Option<String>,
}

/// Authenticated client for the Calendar and Tasks REST APIs.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    access_token: String,
    calendar_base: Url,
    tasks_base: Url,
}

impl GoogleClient {
    /// Client against the production Google endpoints.
    pub fn new(
        http: reqwest::Client,
        access_token: impl Into<String>,
    ) -> Result<Self, GoogleApiError> {
        Self::with_base_urls(http, access_token, CALENDAR_API_BASE, TASKS_API_BASE)
    }

    /// Client against explicit API roots (used against mock servers in tests).
    pub fn with_base_urls(
        http: reqwest::Client,
        access_token: impl Into<String>,
        calendar_base: &str,
        tasks_base: &str,
    ) -> Result<Self, GoogleApiError> {
        let parse = |s: &str| {
            Url::parse(s).map_err(|e| GoogleApiError::InvalidBaseUrl(format!("{}: {}", s, e)))
        };
        Ok(Self {
            http,
            access_token: access_token.into(),
            calendar_base: parse(calendar_base)?,
            tasks_base: parse(tasks_base)?,
        })
    }

    /// GET every page of a list endpoint, following `nextPageToken`.
    async fn list_all(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Vec<serde_json::Value>, GoogleApiError> {
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(query);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp = check_status(request.send().await?).await?;
            let body: ItemPage = resp.json().await?;
            all_items.extend(body.items);

            page_token = body.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(all_items)
    }

    /// PATCH a resource with a partial JSON body.
    async fn patch(&self, url: Url, body: &serde_json::Value) -> Result<(), GoogleApiError> {
        let request = self
            .http
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(body);
        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// Append percent-encoded path segments to an API root.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, GoogleApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GoogleApiError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GoogleApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleApiError::AuthExpired);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://www.googleapis.com/calendar/v3").unwrap();
        let calendar_id = "team#holiday@group.v.calendar.google.com";
        let url = endpoint(&base, &["calendars", calendar_id, "events"]).unwrap();
        assert_eq!(
            url.path(),
            "/calendar/v3/calendars/team%23holiday@group.v.calendar.google.com/events"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_base() {
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        let url = endpoint(&base, &["lists", "abc", "tasks"]).unwrap();
        assert_eq!(url.path(), "/lists/abc/tasks");
    }

    #[test]
    fn test_invalid_base_url() {
        let err =
            GoogleClient::with_base_urls(reqwest::Client::new(), "t", "not a url", TASKS_API_BASE)
                .unwrap_err();
        assert!(matches!(err, GoogleApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_item_page_deserialization() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [{"id": "a"}, {"id": "b"}],
            "nextPageToken": "p2"
        }"#;
        let page: ItemPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    }

    #[test]
    fn test_item_page_without_items() {
        let page: ItemPage = serde_json::from_str(r#"{"kind": "tasks#tasks"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}

//! Jira REST API v2 access

use jtm_core::issue::RawIssue;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::Credentials;
use crate::prelude::*;

/// Reference to an issue the server just created
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: String,
}

/// Remote source of Jira issues
///
/// Implemented by [`JiraClient`] for the real server and by in-memory fakes
/// in tests.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    /// Run a JQL search and return at most `limit` records
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawIssue>, Error>;

    /// Fetch one issue (with its comments) by key
    async fn fetch_one(&self, key: &str) -> Result<RawIssue, Error>;

    /// Submit a `fields` mapping as a new issue
    async fn create(&self, fields: &Map<String, Value>) -> Result<CreatedIssue, Error>;
}

/// Fields requested from `/search/jql`, which returns bare ids without them
pub const SEARCH_FIELDS: &str =
    "summary,status,priority,issuetype,assignee,reporter,creator,parent,labels,created,updated,description";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

/// HTTP client bound to one Jira server
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
}

impl JiraClient {
    pub fn new(credentials: &Credentials) -> Result<Self, Error> {
        Ok(Self {
            client: create_authenticated_client(credentials)?,
            base_url: credentials.server.trim_end_matches('/').to_string(),
        })
    }

    fn issue_url(&self, key: &str) -> String {
        f!(
            "{}/rest/api/2/issue/{}",
            self.base_url,
            urlencoding::encode(key)
        )
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, Error> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Remote(f!("Failed to read {action} response: {e}")))?;

        if !status.is_success() {
            return Err(Error::Remote(f!(
                "Failed to {action} [{status}]:\n{}",
                remote_error_message(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Remote(f!("Failed to parse {action} response: {e}")))
    }
}

impl IssueSource for JiraClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawIssue>, Error> {
        let url = f!("{}/rest/api/2/search/jql", self.base_url);
        log::debug!("GET {url} jql={query:?} maxResults={limit}");

        let max_results = limit.to_string();
        let query_params = [
            ("jql", query),
            ("maxResults", max_results.as_str()),
            ("fields", SEARCH_FIELDS),
        ];

        let response = self
            .client
            .get(&url)
            .query(&query_params)
            .send()
            .await
            .map_err(|e| Error::Remote(f!("Failed to send search request: {e}")))?;

        let page: SearchResponse = Self::read_json(response, "search issues").await?;
        log::debug!("Search returned {} issue(s)", page.issues.len());
        Ok(page.issues)
    }

    async fn fetch_one(&self, key: &str) -> Result<RawIssue, Error> {
        let url = self.issue_url(key);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Remote(f!("Failed to fetch issue {key}: {e}")))?;

        Self::read_json(response, &f!("fetch issue {key}")).await
    }

    async fn create(&self, fields: &Map<String, Value>) -> Result<CreatedIssue, Error> {
        let url = f!("{}/rest/api/2/issue", self.base_url);
        log::debug!("POST {url}");

        let payload = serde_json::json!({ "fields": fields });
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Remote(f!("Failed to send create request: {e}")))?;

        Self::read_json(response, "create issue").await
    }
}

/// Create an HTTP client with Basic auth and JSON headers
pub fn create_authenticated_client(credentials: &Credentials) -> Result<reqwest::Client, Error> {
    use base64::Engine;
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

    let auth_string = f!("{}:{}", credentials.username, credentials.api_token);
    let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&f!("Basic {auth_encoded}"))
            .map_err(|e| Error::Config(f!("Invalid header value: {e}")))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Remote(f!("Failed to build HTTP client: {e}")))
}

/// Flatten a Jira error body (`errorMessages` plus per-field `errors`) into text
///
/// Bodies that are not JSON, or carry neither key, are returned as-is.
pub fn remote_error_message(body: &str) -> String {
    let Ok(error_json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let mut messages = Vec::new();

    if let Some(error_messages) = error_json.get("errorMessages").and_then(|em| em.as_array()) {
        messages.extend(
            error_messages
                .iter()
                .filter_map(|msg| msg.as_str())
                .map(str::to_string),
        );
    }

    if let Some(errors) = error_json.get("errors").and_then(|e| e.as_object()) {
        for (field, error) in errors {
            if let Some(error_text) = error.as_str() {
                messages.push(f!("{field}: {error_text}"));
            }
        }
    }

    if messages.is_empty() {
        body.to_string()
    } else {
        messages.join("\n")
    }
}

use crate::error::ApiError;
use crate::services::pagination::{MAX_PAGE_SIZE, PageRequest};
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT, AUTHORIZATION, ACCEPT};
use serde_json::Value;
use log::{error, debug};

const PREVIEW_CHARS: usize = 500;

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    default_token: Option<String>,
    page_size: u32,
}

impl GitHubClient {
    pub fn new(base_url: &str, default_token: Option<String>, page_size: u32) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("github-stats-aggregator"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_token,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Starts a paged request against this client's configured page size.
    pub fn pages<'a>(&self, path: impl Into<String>, auth: Option<&'a str>) -> PageRequest<'a> {
        PageRequest::new(path, self.page_size, auth)
    }

    /// The inbound Authorization value wins when it is non-blank; otherwise the
    /// configured token is sent, if any.
    fn authorization(&self, auth: Option<&str>) -> Option<String> {
        match auth.map(str::trim).filter(|a| !a.is_empty()) {
            Some(forwarded) => Some(forwarded.to_string()),
            None => self.default_token.as_ref().map(|t| format!("Bearer {}", t)),
        }
    }

    /// GETs `path` and returns the decoded body. An empty body decodes to `Null`.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some(value) = self.authorization(auth) {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("GitHub API error {}: {}", status, error_text);
            return Err(ApiError::from_upstream(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_str::<Value>(&response_text) {
            Ok(body) => Ok(body),
            Err(e) => {
                error!("Failed to parse JSON from {}: {}", url, e);
                error!("Response preview: {}", preview(&response_text, PREVIEW_CHARS));
                Err(e.into())
            }
        }
    }

    pub async fn get_repository(&self, owner: &str, repo: &str, auth: Option<&str>) -> Result<Value, ApiError> {
        self.get_json(&format!("/repos/{}/{}", owner, repo), &[], auth).await
    }

    /// Looks up the head commit of `reference` (a branch name or sha).
    pub async fn get_commit(&self, owner: &str, repo: &str, reference: &str, auth: Option<&str>) -> Result<Value, ApiError> {
        self.get_json(&format!("/repos/{}/{}/commits/{}", owner, repo, reference), &[], auth).await
    }

    pub async fn get_user(&self, username: &str, auth: Option<&str>) -> Result<Value, ApiError> {
        self.get_json(&format!("/users/{}", username), &[], auth).await
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

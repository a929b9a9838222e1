//! Page-number pagination over GitHub collection endpoints.
//!
//! A collection is walked from page 1 until a page comes back empty or
//! shorter than the requested page size. There is no page cap.

use crate::error::ApiError;
use crate::services::github::GitHubClient;
use serde_json::Value;
use log::debug;

/// GitHub refuses `per_page` values above this.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One paged collection request: the resource path, its fixed filters and
/// the credential to forward.
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub path: String,
    pub params: Vec<(&'static str, String)>,
    pub per_page: u32,
    pub auth: Option<&'a str>,
}

/// The items of a single page.
#[derive(Debug)]
pub struct PageResult {
    pub items: Vec<Value>,
    pub is_last_page: bool,
}

impl<'a> PageRequest<'a> {
    pub fn new(path: impl Into<String>, per_page: u32, auth: Option<&'a str>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
            auth,
        }
    }

    /// Adds a fixed filter sent with every page, e.g. `state=all`.
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    fn query_for(&self, page: u32) -> Vec<(&str, String)> {
        let mut query: Vec<(&str, String)> = self.params.iter().map(|(k, v)| (*k, v.clone())).collect();
        query.push(("per_page", self.per_page.to_string()));
        query.push(("page", page.to_string()));
        query
    }
}

impl GitHubClient {
    pub async fn fetch_page(&self, request: &PageRequest<'_>, page: u32) -> Result<PageResult, ApiError> {
        let body = self.get_json(&request.path, &request.query_for(page), request.auth).await?;

        let items = match body {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => {
                return Err(ApiError::Internal(format!(
                    "Expected a JSON array from {}, got {}",
                    request.path,
                    json_kind(&other)
                )));
            }
        };

        let is_last_page = items.len() < request.per_page as usize;
        Ok(PageResult { items, is_last_page })
    }

    /// Walks every page of `request`, folding each non-empty page into `acc`.
    pub async fn fold_pages<T, F>(&self, request: &PageRequest<'_>, init: T, mut fold: F) -> Result<T, ApiError>
    where
        F: FnMut(T, Vec<Value>) -> T,
    {
        let mut acc = init;
        let mut page = 1;

        loop {
            let result = self.fetch_page(request, page).await?;

            if result.items.is_empty() {
                debug!("{} page {}: empty, stopping", request.path, page);
                break;
            }

            debug!("{} page {}: {} items", request.path, page, result.items.len());
            let is_last_page = result.is_last_page;
            acc = fold(acc, result.items);

            if is_last_page {
                break;
            }
            page += 1;
        }

        Ok(acc)
    }

    /// Fetches every item of a paged collection into memory.
    pub async fn drain(&self, request: &PageRequest<'_>) -> Result<Vec<Value>, ApiError> {
        let items = self
            .fold_pages(request, Vec::new(), |mut all, page| {
                all.extend(page);
                all
            })
            .await?;

        debug!("Drained {} items from {}", items.len(), request.path);
        Ok(items)
    }

    /// Counts the items of a paged collection without keeping them.
    pub async fn count(&self, request: &PageRequest<'_>) -> Result<usize, ApiError> {
        self.fold_pages(request, 0, |total, page| total + page.len()).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

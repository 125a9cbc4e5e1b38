use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::FetchError,
    filters::{PAGE_PARAM, PER_PAGE_PARAM, is_reserved_param},
    models::{DEFAULT_PAGE, DEFAULT_PER_PAGE, PaginatedResponse, PaginationMeta},
};

/// ListRepository Trait
///
/// The fetch boundary used by every list view: "GET this resource with this query, give
/// me the paginated envelope". Transport, retries and authentication headers are the
/// implementation's concern.
///
/// Rows come back untyped; `ListQuery` decodes them into the screen's row type.
#[async_trait]
pub trait ListRepository: Send + Sync {
    async fn fetch_page(
        &self,
        resource: &str,
        query: &[(String, String)],
    ) -> Result<PaginatedResponse<Value>, FetchError>;
}

/// RepositoryState
///
/// The shared handle to the fetch boundary held by `ConsoleState`.
pub type RepositoryState = Arc<dyn ListRepository>;

// --- HTTP Implementation ---

/// HttpRepository
///
/// `ListRepository` over the console API with reqwest. Issues
/// `GET {base_url}/{resource}?{query}` and tags each request with a fresh `x-request-id`
/// so client and server logs can be correlated.
#[derive(Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }
}

#[async_trait]
impl ListRepository for HttpRepository {
    async fn fetch_page(
        &self,
        resource: &str,
        query: &[(String, String)],
    ) -> Result<PaginatedResponse<Value>, FetchError> {
        let request_id = Uuid::new_v4();
        let url = self.url_for(resource);
        let span = tracing::info_span!("list_fetch", resource, req_id = %request_id);

        async move {
            let response = self
                .client
                .get(&url)
                .header("x-request-id", request_id.to_string())
                .query(query)
                .send()
                .await
                .map_err(|source| FetchError::Transport {
                    resource: resource.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(status = status.as_u16(), "list fetch rejected");
                return Err(FetchError::Status {
                    resource: resource.to_string(),
                    status: status.as_u16(),
                });
            }

            let page = response
                .json::<PaginatedResponse<Value>>()
                .await
                .map_err(|source| FetchError::Decode {
                    resource: resource.to_string(),
                    source: Box::new(source),
                })?;

            tracing::debug!(
                rows = page.data.len(),
                total = page.meta.total,
                "list fetch completed"
            );
            Ok(page)
        }
        .instrument(span)
        .await
    }
}

// --- In-Memory Implementation (For Tests) ---

/// MockRepository
///
/// Serves canned rows per resource and paginates them according to `page` / `per_page`.
/// Plain text filters are applied as equality on the row field of the same name. Every
/// request is recorded so tests can assert on what was (or was not) fetched.
#[derive(Default)]
pub struct MockRepository {
    rows: BTreeMap<String, Vec<Value>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    /// When true, all fetches fail.
    pub should_fail: bool,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_rows(mut self, resource: &str, rows: Vec<Value>) -> Self {
        self.rows.insert(resource.to_string(), rows);
        self
    }

    /// Every `(resource, query)` fetched so far, oldest first.
    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|requests| requests.len()).unwrap_or(0)
    }
}

fn is_reserved(key: &str) -> bool {
    is_reserved_param(key) || key.contains('[')
}

fn field_matches(row: &Value, field: &str, expected: &str) -> bool {
    match row.get(field) {
        Some(Value::String(actual)) => actual == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

#[async_trait]
impl ListRepository for MockRepository {
    async fn fetch_page(
        &self,
        resource: &str,
        query: &[(String, String)],
    ) -> Result<PaginatedResponse<Value>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((resource.to_string(), query.to_vec()));
        }

        if self.should_fail {
            return Err(FetchError::Simulated {
                resource: resource.to_string(),
                message: "mock repository configured to fail".to_string(),
            });
        }

        let number = |name: &str, default: u32| {
            query
                .iter()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<u32>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(default)
        };
        let page = number(PAGE_PARAM, DEFAULT_PAGE);
        let per_page = number(PER_PAGE_PARAM, DEFAULT_PER_PAGE);

        let matching: Vec<&Value> = self
            .rows
            .get(resource)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .iter()
                            .filter(|(key, _)| !is_reserved(key))
                            .all(|(key, expected)| field_matches(row, key, expected))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let total = matching.len() as u64;
        let last_page = (matching.len() as u32).div_ceil(per_page).max(1);
        let data = matching
            .into_iter()
            .skip((page as usize - 1).saturating_mul(per_page as usize))
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok(PaginatedResponse {
            data,
            meta: PaginationMeta {
                current_page: page,
                per_page,
                total,
                last_page,
            },
        })
    }
}

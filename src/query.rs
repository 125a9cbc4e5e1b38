use serde::{Serialize, de::DeserializeOwned};
use std::collections::{HashMap, VecDeque};

use crate::{
    error::FetchError,
    filters::encode_state,
    models::{FilterState, FilterValue, PaginatedResponse},
    repository::ListRepository,
};

// --- Query-Key Projection ---

/// QueryKey
///
/// Cache key of one list request: the resource name plus the normalized filter state.
/// Two states that constrain the same rows project to equal keys, whatever order their
/// filters were set in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryKey {
    resource: String,
    state: FilterState,
}

impl QueryKey {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// The GET query for this key, one pair per value.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        encode_state(&self.state)
            .into_iter()
            .flat_map(|(key, values)| values.into_iter().map(move |value| (key.clone(), value)))
            .collect()
    }

    /// Stable textual form, handy for logs and external caches.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.resource.clone())
    }
}

/// project_key
///
/// Normalizes `state` for caching: filter entries ordered by key, empty entries dropped,
/// list values sorted and de-duplicated.
pub fn project_key(resource: &str, state: &FilterState) -> QueryKey {
    let filters = state
        .filters
        .iter()
        .filter_map(|(key, value)| normalize_value(value.clone()).map(|value| (key.clone(), value)))
        .collect();

    QueryKey {
        resource: resource.to_string(),
        state: FilterState {
            pagination: state.pagination,
            sorting: state.sorting.clone(),
            filters,
        },
    }
}

fn normalize_value(value: FilterValue) -> Option<FilterValue> {
    match value.normalized()? {
        FilterValue::List(mut items) => {
            items.sort();
            items.dedup();
            Some(FilterValue::List(items))
        }
        other => Some(other),
    }
}

// --- List Query ---

/// Pages one list view keeps cached before the oldest cached key is evicted.
pub const CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// ListQuery
///
/// The fetch-layer state of one list view. Pages are cached per `QueryKey`; switching to
/// a key already seen reuses its page without a request. While a new key is in flight the
/// previously displayed page stays visible, and a response that arrives for a key that is
/// no longer current is cached but never displayed. Errors keep the previous page too.
///
/// The cache holds at most `CACHE_CAPACITY` pages (first cached, first evicted) and is
/// dropped with the view.
#[derive(Debug)]
pub struct ListQuery<T> {
    resource: String,
    current: Option<QueryKey>,
    displayed: Option<(QueryKey, PaginatedResponse<T>)>,
    cache: HashMap<QueryKey, PaginatedResponse<T>>,
    cached_order: VecDeque<QueryKey>,
    capacity: usize,
    status: QueryStatus,
    error: Option<String>,
}

impl<T: Clone> ListQuery<T> {
    pub fn new(resource: impl Into<String>) -> Self {
        Self::with_cache_capacity(resource, CACHE_CAPACITY)
    }

    /// Like `new`, keeping at most `capacity` pages (never fewer than one).
    pub fn with_cache_capacity(resource: impl Into<String>, capacity: usize) -> Self {
        Self {
            resource: resource.into(),
            current: None,
            displayed: None,
            cache: HashMap::new(),
            cached_order: VecDeque::new(),
            capacity: capacity.max(1),
            status: QueryStatus::Idle,
            error: None,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn key_for(&self, state: &FilterState) -> QueryKey {
        project_key(&self.resource, state)
    }

    /// Makes `key` current. Returns `true` when the caller must fetch it.
    pub fn begin(&mut self, key: QueryKey) -> bool {
        if self.current.as_ref() == Some(&key) && self.status == QueryStatus::Loading {
            return false;
        }

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(key = %key.cache_key(), "list query served from cache");
            self.displayed = Some((key.clone(), cached.clone()));
            self.current = Some(key);
            self.status = QueryStatus::Success;
            self.error = None;
            return false;
        }

        self.current = Some(key);
        self.status = QueryStatus::Loading;
        true
    }

    /// Records the outcome of a fetch started by `begin`.
    pub fn complete(&mut self, key: &QueryKey, result: Result<PaginatedResponse<T>, FetchError>) {
        let is_current = self.current.as_ref() == Some(key);

        match result {
            Ok(page) => {
                self.remember(key.clone(), page.clone());
                if is_current {
                    self.displayed = Some((key.clone(), page));
                    self.status = QueryStatus::Success;
                    self.error = None;
                } else {
                    tracing::debug!(key = %key.cache_key(), "stale list response cached, not displayed");
                }
            }
            Err(e) => {
                if is_current {
                    tracing::warn!(key = %key.cache_key(), error = %e, "list fetch failed, keeping previous data");
                    self.status = QueryStatus::Error;
                    self.error = Some(e.to_string());
                } else {
                    tracing::debug!(key = %key.cache_key(), error = %e, "stale list fetch failed");
                }
            }
        }
    }

    fn remember(&mut self, key: QueryKey, page: PaginatedResponse<T>) {
        if self.cache.insert(key.clone(), page).is_some() {
            return;
        }
        self.cached_order.push_back(key);
        while self.cached_order.len() > self.capacity {
            if let Some(oldest) = self.cached_order.pop_front() {
                tracing::trace!(key = %oldest.cache_key(), "list page evicted from cache");
                self.cache.remove(&oldest);
            }
        }
    }

    /// Drops every cached page so the next `begin` fetches again. The displayed page stays.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.cached_order.clear();
    }

    /// The page on screen, possibly belonging to a previous key.
    pub fn data(&self) -> Option<&PaginatedResponse<T>> {
        self.displayed.as_ref().map(|(_, page)| page)
    }

    /// True when the displayed page belongs to a key other than the current one.
    pub fn is_previous_data(&self) -> bool {
        match (&self.displayed, &self.current) {
            (Some((shown, _)), Some(current)) => shown != current,
            _ => false,
        }
    }

    pub fn current_key(&self) -> Option<&QueryKey> {
        self.current.as_ref()
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<T: Clone + DeserializeOwned> ListQuery<T> {
    /// load
    ///
    /// Projects `state`, fetches it through `repo` when it is not cached, and decodes the
    /// rows. Returns the resulting status; fetch failures are absorbed into it.
    pub async fn load(&mut self, repo: &dyn ListRepository, state: &FilterState) -> QueryStatus {
        let key = self.key_for(state);
        if !self.begin(key.clone()) {
            return self.status;
        }

        let result = repo
            .fetch_page(key.resource(), &key.to_query_pairs())
            .await
            .and_then(|page| {
                page.decode_rows::<T>().map_err(|source| FetchError::Decode {
                    resource: key.resource().to_string(),
                    source: Box::new(source),
                })
            });

        self.complete(&key, result);
        self.status
    }
}

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use url::form_urlencoded;

use crate::routes::{PathPrivilegeMap, RouteParams, extract_params};

// --- Search Parameters ---

/// SearchParams
///
/// The URL query string as a mapping from name to every value given for it.
/// Kept sorted by name so the rendered query string is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(BTreeMap<String, Vec<String>>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=1&b=2&b=3`, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params
                .0
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        params
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.0.insert(key.into(), values);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies a shallow write: listed keys are replaced or removed, every other
    /// parameter is left as it was.
    pub fn apply(&mut self, update: &SearchParamsUpdate) {
        for key in &update.remove {
            self.0.remove(key);
        }
        for (key, values) in &update.set {
            self.0.insert(key.clone(), values.clone());
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.0 {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.0.entry(key.into()).or_default().push(value.into());
        }
        params
    }
}

/// SearchParamsUpdate
///
/// A shallow URL write request produced by a list view: keys to overwrite and keys to drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParamsUpdate {
    pub set: BTreeMap<String, Vec<String>>,
    pub remove: BTreeSet<String>,
}

// --- Location & Navigation ---

/// Location
///
/// What the router reports for the active URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub params: RouteParams,
    pub search: SearchParams,
}

impl Location {
    /// Splits `"/vendors?page=2"` into pathname and search. Params are left empty;
    /// resolving them is the router's job.
    pub fn parse(href: &str) -> Self {
        let (pathname, query) = href.split_once('?').unwrap_or((href, ""));
        Self {
            pathname: pathname.to_string(),
            params: RouteParams::new(),
            search: SearchParams::parse(query),
        }
    }

    pub fn href(&self) -> String {
        if self.search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search.to_query_string())
        }
    }
}

/// Navigator
///
/// Outbound boundary for programmatic navigation.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// MemoryRouter
///
/// A history-stack router that resolves dynamic parameters from the console's route
/// patterns. Stands in for the browser router in tests and in the inspection binary.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    routes: Arc<PathPrivilegeMap>,
    location: Location,
    history: Vec<String>,
}

impl MemoryRouter {
    pub fn new(routes: Arc<PathPrivilegeMap>, initial: &str) -> Self {
        let mut router = Self {
            routes,
            location: Location::default(),
            history: Vec::new(),
        };
        router.navigate(initial);
        router
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Every href navigated to, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Writes list-view state into the query string without leaving the page.
    pub fn replace_search(&mut self, update: &SearchParamsUpdate) {
        self.location.search.apply(update);
        if let Some(current) = self.history.last_mut() {
            *current = self.location.href();
        }
    }

    fn resolve_params(&self, pathname: &str) -> RouteParams {
        self.routes
            .patterns()
            .find_map(|pattern| extract_params(pattern, pathname))
            .unwrap_or_default()
    }
}

impl Navigator for MemoryRouter {
    fn navigate(&mut self, path: &str) {
        let mut location = Location::parse(path);
        location.params = self.resolve_params(&location.pathname);
        tracing::debug!(href = %path, params = ?location.params, "navigate");
        self.history.push(location.href());
        self.location = location;
    }
}

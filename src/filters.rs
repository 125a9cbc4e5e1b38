use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{
    models::{
        DEFAULT_PAGE, FilterState, FilterValue, Pagination, SortOrder, Sorting, clamp_positive,
    },
    router::{SearchParams, SearchParamsUpdate},
};

// --- Query Parameter Names ---

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "per_page";
pub const SORT_BY_PARAM: &str = "sort_by";
pub const SORT_ORDER_PARAM: &str = "sort_order";

const RESERVED_PARAMS: [&str; 4] = [PAGE_PARAM, PER_PAGE_PARAM, SORT_BY_PARAM, SORT_ORDER_PARAM];

/// True for the parameter names owned by pagination and sorting. These can never be filters.
pub fn is_reserved_param(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key)
}

fn list_param(key: &str) -> String {
    format!("{key}[]")
}

fn range_params(key: &str) -> (String, String) {
    (format!("{key}[from]"), format!("{key}[to]"))
}

/// encode_state
///
/// Renders a filter state as query parameters. The same encoding is used for the URL
/// reflection and for the list request, so a copied URL reproduces the exact fetch:
///
/// - pagination as `page` and `per_page`;
/// - sorting as `sort_by` and `sort_order`, omitted when unsorted;
/// - text filters as `key=value`, lists as repeated `key[]=value`, ranges as
///   `key[from]` / `key[to]`.
///
/// A filter stored under a reserved name is skipped; pagination and sorting always win.
pub fn encode_state(state: &FilterState) -> BTreeMap<String, Vec<String>> {
    let mut params = BTreeMap::new();

    for (key, value) in &state.filters {
        if is_reserved_param(key) {
            continue;
        }
        match value {
            FilterValue::Text(text) => {
                params.insert(key.clone(), vec![text.clone()]);
            }
            FilterValue::List(items) => {
                params.insert(list_param(key), items.clone());
            }
            FilterValue::Range { from, to } => {
                let (from_key, to_key) = range_params(key);
                if let Some(from) = from {
                    params.insert(from_key, vec![from.clone()]);
                }
                if let Some(to) = to {
                    params.insert(to_key, vec![to.clone()]);
                }
            }
        }
    }

    params.insert(PAGE_PARAM.to_string(), vec![state.pagination.page.to_string()]);
    params.insert(
        PER_PAGE_PARAM.to_string(),
        vec![state.pagination.per_page.to_string()],
    );
    if let Some(sorting) = &state.sorting {
        params.insert(SORT_BY_PARAM.to_string(), vec![sorting.field.clone()]);
        params.insert(
            SORT_ORDER_PARAM.to_string(),
            vec![sorting.order.as_str().to_string()],
        );
    }

    params
}

// --- Filter Schema ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    List,
    Range,
}

/// FilterSchema
///
/// The filter keys a list view recognizes in its URL, with the shape of each value.
/// Keys are opaque to the store (`lang_pair`, `type_classifier_value_id`, ...).
#[derive(Debug, Clone, Default)]
pub struct FilterSchema {
    keys: BTreeMap<String, FilterKind>,
}

impl FilterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into(), FilterKind::Text);
        self
    }

    pub fn list(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into(), FilterKind::List);
        self
    }

    pub fn range(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into(), FilterKind::Range);
        self
    }

    pub fn kind(&self, key: &str) -> Option<FilterKind> {
        self.keys.get(key).copied()
    }

    /// Every query parameter name this schema may read or write.
    fn url_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for (key, kind) in &self.keys {
            match kind {
                FilterKind::Text => {
                    keys.insert(key.clone());
                }
                FilterKind::List => {
                    keys.insert(key.clone());
                    keys.insert(list_param(key));
                }
                FilterKind::Range => {
                    let (from_key, to_key) = range_params(key);
                    keys.insert(from_key);
                    keys.insert(to_key);
                }
            }
        }
        keys
    }

    /// Brings a non-empty `value` into the shape declared for `key`, so that what is written
    /// to the URL reads back unchanged. Undeclared keys keep the shape they were given.
    /// `None` when the value cannot be expressed in the declared shape.
    fn coerce(&self, key: &str, value: FilterValue) -> Option<FilterValue> {
        let Some(kind) = self.kind(key) else {
            return Some(value);
        };
        match (kind, value) {
            (FilterKind::Text, value @ FilterValue::Text(_))
            | (FilterKind::List, value @ FilterValue::List(_))
            | (FilterKind::Range, value @ FilterValue::Range { .. }) => Some(value),
            (FilterKind::List, FilterValue::Text(text)) => Some(FilterValue::List(vec![text])),
            (FilterKind::Text, FilterValue::List(mut items)) if items.len() == 1 => {
                items.pop().map(FilterValue::Text)
            }
            _ => None,
        }
    }

    fn decode(&self, key: &str, kind: FilterKind, params: &SearchParams) -> Option<FilterValue> {
        let value = match kind {
            FilterKind::Text => FilterValue::Text(params.get(key)?.to_string()),
            FilterKind::List => FilterValue::List(
                params
                    .get_all(&list_param(key))
                    .iter()
                    .chain(params.get_all(key))
                    .cloned()
                    .collect(),
            ),
            FilterKind::Range => {
                let (from_key, to_key) = range_params(key);
                FilterValue::range(params.get(&from_key), params.get(&to_key))
            }
        };
        value.normalized()
    }
}

// --- Filter State Store ---

type Listener = Box<dyn FnMut(&FilterState)>;

/// FilterStore
///
/// The filter/sort/pagination state of one list view. Owned by that view and dropped
/// with it; nothing is persisted beyond the URL reflection.
///
/// Mutators never fail. Empty filter values remove their key, out-of-range pagination
/// is clamped, and any change to filters or sorting sends the view back to page 1.
/// Listeners run after every mutation that actually changed the state.
pub struct FilterStore {
    schema: FilterSchema,
    state: FilterState,
    reflected: BTreeSet<String>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("schema", &self.schema)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl FilterStore {
    /// A store at the given pagination defaults, unsorted and unfiltered.
    pub fn new(schema: FilterSchema, defaults: Pagination) -> Self {
        Self {
            schema,
            state: FilterState::with_pagination(defaults),
            reflected: BTreeSet::new(),
            listeners: Vec::new(),
        }
    }

    /// from_search_params
    ///
    /// Mount-time state from the URL. Unparseable numbers fall back to `defaults`, values
    /// below 1 are clamped, `sort_by` without a valid `sort_order` sorts ascending, and a
    /// `sort_order` alone is ignored. Unrecognized parameters are left alone.
    pub fn from_search_params(
        schema: FilterSchema,
        params: &SearchParams,
        defaults: Pagination,
    ) -> Self {
        // 1. Pagination: unparseable falls back, out of range clamps.
        let parse_number = |key: &str| {
            params
                .get(key)
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .map(clamp_positive)
        };

        let pagination = Pagination {
            page: parse_number(PAGE_PARAM).unwrap_or(defaults.page),
            per_page: parse_number(PER_PAGE_PARAM).unwrap_or(defaults.per_page),
        };

        // 2. Sorting needs a field; the order is optional.
        let sorting = params
            .get(SORT_BY_PARAM)
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(|field| {
                let order = params
                    .get(SORT_ORDER_PARAM)
                    .and_then(SortOrder::from_param)
                    .unwrap_or(SortOrder::Asc);
                Sorting::new(field, order)
            });

        // 3. Declared filters only. Reserved names belong to steps 1 and 2.
        let filters = schema
            .keys
            .iter()
            .filter(|(key, _)| !is_reserved_param(key))
            .filter_map(|(key, kind)| {
                schema
                    .decode(key, *kind, params)
                    .map(|value| (key.clone(), value))
            })
            .collect();

        let state = FilterState {
            pagination,
            sorting,
            filters,
        };
        tracing::debug!(?state, "filter state restored from url");

        Self {
            schema,
            state,
            reflected: BTreeSet::new(),
            listeners: Vec::new(),
        }
    }

    /// The current state (`getFilters`).
    pub fn filters(&self) -> &FilterState {
        &self.state
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&FilterState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Merges one filter key. An empty value (`""`, an empty list, a range with no
    /// bounds) removes the key instead. Always returns to page 1.
    ///
    /// Values are stored in the shape the schema declares for the key: a single text value
    /// on a list key becomes a one-element list. Values that fit neither shape, and keys
    /// named like a pagination or sort parameter, are ignored.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        if is_reserved_param(&key) {
            tracing::warn!(key = %key, "filter key is a pagination or sort parameter, ignored");
            return;
        }

        let mut next = self.state.clone();
        match value.into().normalized() {
            Some(value) => match self.schema.coerce(&key, value) {
                Some(value) => {
                    next.filters.insert(key, value);
                }
                None => {
                    tracing::warn!(
                        key = %key,
                        kind = ?self.schema.kind(&key),
                        "filter value does not fit the declared kind, ignored"
                    );
                    return;
                }
            },
            None => {
                next.filters.remove(&key);
            }
        }
        next.pagination.page = DEFAULT_PAGE;
        self.commit(next, "set_filter");
    }

    pub fn remove_filter(&mut self, key: &str) {
        let mut next = self.state.clone();
        next.filters.remove(key);
        next.pagination.page = DEFAULT_PAGE;
        self.commit(next, "remove_filter");
    }

    /// Replaces the sort wholesale. Sorting also returns to page 1.
    pub fn set_sort(&mut self, sorting: Option<Sorting>) {
        let mut next = self.state.clone();
        next.sorting = sorting.filter(|sorting| !sorting.field.trim().is_empty());
        next.pagination.page = DEFAULT_PAGE;
        self.commit(next, "set_sort");
    }

    pub fn set_page(&mut self, page: i64) {
        let mut next = self.state.clone();
        next.pagination.page = clamp_positive(page);
        self.commit(next, "set_page");
    }

    pub fn set_per_page(&mut self, per_page: i64) {
        let mut next = self.state.clone();
        next.pagination.per_page = clamp_positive(per_page);
        self.commit(next, "set_per_page");
    }

    /// Clears filters and sorting and returns to page 1. The page size is kept.
    pub fn reset_filters(&mut self) {
        let next = FilterState::with_pagination(Pagination {
            page: DEFAULT_PAGE,
            per_page: self.state.pagination.per_page,
        });
        self.commit(next, "reset_filters");
    }

    /// search_params_update
    ///
    /// The URL write for the current state. Keys this store owns but no longer uses
    /// (cleared filters, a dropped sort) are removed; unrelated parameters are never touched.
    pub fn search_params_update(&mut self) -> SearchParamsUpdate {
        let set = encode_state(&self.state);

        // Everything this store may have written before, minus what it writes now.
        let mut remove = self.schema.url_keys();
        remove.extend(std::mem::take(&mut self.reflected));
        remove.insert(SORT_BY_PARAM.to_string());
        remove.insert(SORT_ORDER_PARAM.to_string());
        remove.retain(|key| !set.contains_key(key));

        // Remembered so opaque keys can be cleared on a later write.
        self.reflected = set.keys().cloned().collect();
        SearchParamsUpdate { set, remove }
    }

    fn commit(&mut self, next: FilterState, intent: &'static str) {
        if next == self.state {
            tracing::trace!(intent, "filter state unchanged");
            return;
        }
        self.state = next;
        tracing::trace!(intent, state = ?self.state, "filter state changed");
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use ts_rs::TS;

// --- List-View Filter State ---

/// First page of every list view.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when neither the URL nor the configuration provides one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Clamps any incoming integer to the `>= 1` range used by pagination.
pub(crate) fn clamp_positive(value: i64) -> u32 {
    value.clamp(1, i64::from(u32::MAX)) as u32
}

/// Pagination
///
/// The pagination half of a list view's state. Both fields are always present and positive;
/// construction through `new` clamps out-of-range input instead of rejecting it.
/// Deserialization goes through `new` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: clamp_positive(page),
            per_page: clamp_positive(per_page),
        }
    }
}

impl<'de> Deserialize<'de> for Pagination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            page: i64,
            per_page: i64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Pagination::new(raw.page, raw.per_page))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// SortOrder
///
/// Serialized exactly as the `sort_order` query parameter expects (`asc` / `desc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Parses a `sort_order` query value. Anything other than `asc`/`desc` is rejected.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Sorting
///
/// A complete sort instruction. There is no way to hold a field without an order:
/// the list state carries `Option<Sorting>`, so sorting is either fully present or absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sorting {
    pub field: String,
    pub order: SortOrder,
}

impl Sorting {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// FilterValue
///
/// The value of a single column filter. Serialized untagged so the JSON shape matches
/// what the list screens send: a string, an array of strings, or a `{ from, to }` range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
    Range {
        from: Option<String>,
        to: Option<String>,
    },
}

impl FilterValue {
    pub fn range(from: Option<&str>, to: Option<&str>) -> Self {
        FilterValue::Range {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    /// Drops blank parts of the value. Returns `None` when nothing constraining is left,
    /// which callers treat as "remove the filter key".
    pub fn normalized(self) -> Option<Self> {
        match self {
            FilterValue::Text(text) => (!text.trim().is_empty()).then_some(FilterValue::Text(text)),
            FilterValue::List(items) => {
                let items: Vec<String> = items
                    .into_iter()
                    .filter(|item| !item.trim().is_empty())
                    .collect();
                (!items.is_empty()).then_some(FilterValue::List(items))
            }
            FilterValue::Range { from, to } => {
                let from = from.filter(|v| !v.trim().is_empty());
                let to = to.filter(|v| !v.trim().is_empty());
                (from.is_some() || to.is_some()).then_some(FilterValue::Range { from, to })
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for FilterValue {
    fn from(values: Vec<S>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// FilterState
///
/// The single normalized record a list view keeps for its filter, sort and pagination
/// parameters. Keys missing from `filters` mean "no constraint"; empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FilterState {
    pub pagination: Pagination,
    pub sorting: Option<Sorting>,
    pub filters: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn with_pagination(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }
}

// --- Fetch Envelope ---

/// PaginationMeta
///
/// The `meta` block of every paginated list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

/// PaginatedResponse
///
/// Response envelope returned by every list endpoint: `{ data: T[], meta: {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl PaginatedResponse<serde_json::Value> {
    /// Converts the untyped rows returned by the fetch boundary into a screen's row type.
    pub fn decode_rows<T: DeserializeOwned>(self) -> Result<PaginatedResponse<T>, serde_json::Error> {
        let data = self
            .data
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(PaginatedResponse {
            data,
            meta: self.meta,
        })
    }
}

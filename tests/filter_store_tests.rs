use admin_console_core::{
    FilterSchema, FilterStore, FilterValue, Pagination, SearchParams, SortOrder, Sorting,
    project_key,
};
use std::{cell::RefCell, rc::Rc};

fn schema() -> FilterSchema {
    FilterSchema::new()
        .text("lang_pair")
        .text("type_classifier_value_id")
        .list("status")
        .range("created_at")
}

fn store() -> FilterStore {
    FilterStore::new(schema(), Pagination::default())
}

// --- Defaults & URL Restoration ---

#[test]
fn test_defaults_without_url_state() {
    let store = FilterStore::from_search_params(schema(), &SearchParams::new(), Pagination::default());
    let state = store.filters();

    assert_eq!(state.pagination, Pagination { page: 1, per_page: 10 });
    assert_eq!(state.sorting, None);
    assert!(state.filters.is_empty());
}

#[test]
fn test_initial_state_is_parsed_from_the_url() {
    let params = SearchParams::parse(
        "page=3&per_page=25&sort_by=name&sort_order=desc&lang_pair=en-de\
         &status%5B%5D=active&status%5B%5D=pending&created_at%5Bfrom%5D=2024-01-01&tab=details",
    );

    let store = FilterStore::from_search_params(schema(), &params, Pagination::default());
    let state = store.filters();

    assert_eq!(state.pagination, Pagination { page: 3, per_page: 25 });
    assert_eq!(state.sorting, Some(Sorting::desc("name")));
    assert_eq!(state.filters["lang_pair"], FilterValue::from("en-de"));
    assert_eq!(state.filters["status"], FilterValue::from(vec!["active", "pending"]));
    assert_eq!(
        state.filters["created_at"],
        FilterValue::range(Some("2024-01-01"), None)
    );
    // Unrecognized parameters are not filters.
    assert!(!state.filters.contains_key("tab"));
}

#[test]
fn test_malformed_url_values_are_clamped_or_defaulted() {
    let params = SearchParams::parse("page=-4&per_page=abc&sort_order=desc&lang_pair=");
    let store = FilterStore::from_search_params(schema(), &params, Pagination::new(1, 50));
    let state = store.filters();

    assert_eq!(state.pagination, Pagination { page: 1, per_page: 50 });
    // An order without a field is not a sort.
    assert_eq!(state.sorting, None);
    assert!(!state.filters.contains_key("lang_pair"));
}

#[test]
fn test_sort_field_without_order_sorts_ascending() {
    let params = SearchParams::parse("sort_by=created_at&sort_order=sideways");
    let store = FilterStore::from_search_params(schema(), &params, Pagination::default());
    assert_eq!(
        store.filters().sorting,
        Some(Sorting::new("created_at", SortOrder::Asc))
    );
}

// --- Mutations ---

#[test]
fn test_set_filter_resets_page() {
    let mut store = store();
    store.set_page(5);
    assert_eq!(store.filters().pagination.page, 5);

    store.set_filter("status", "open");

    assert_eq!(store.filters().pagination.page, 1);
    assert_eq!(store.filters().filters["status"], FilterValue::from(vec!["open"]));
}

#[test]
fn test_values_take_the_declared_shape() {
    let mut store = store();

    store.set_filter("lang_pair", vec!["en-de"]);
    assert_eq!(store.filters().filters["lang_pair"], FilterValue::from("en-de"));

    // A range key cannot hold a list; the mutation is dropped.
    store.set_page(4);
    store.set_filter("created_at", vec!["2024-01-01"]);
    assert!(!store.filters().filters.contains_key("created_at"));
    assert_eq!(store.filters().pagination.page, 4);
}

#[test]
fn test_pagination_and_sort_names_are_never_filters() {
    let mut store = store();
    store.set_page(3);

    store.set_filter("per_page", "abc");
    store.set_filter("sort_by", "name");

    let state = store.filters();
    assert!(state.filters.is_empty());
    assert_eq!(state.pagination, Pagination { page: 3, per_page: 10 });

    let pairs = project_key("orders", state).to_query_pairs();
    assert!(pairs.contains(&("per_page".to_string(), "10".to_string())));
    assert!(pairs.contains(&("page".to_string(), "3".to_string())));
    assert!(!pairs.iter().any(|(key, _)| key == "sort_by"));
}

#[test]
fn test_schema_entry_named_like_pagination_is_not_read_as_filter() {
    let schema = FilterSchema::new().text("page");
    let store =
        FilterStore::from_search_params(schema, &SearchParams::parse("page=2"), Pagination::default());

    assert!(store.filters().filters.is_empty());
    assert_eq!(store.filters().pagination.page, 2);
}

#[test]
fn test_empty_value_removes_the_key() {
    let mut store = store();
    store.set_filter("status", "open");
    store.set_filter("status", "");
    assert!(!store.filters().filters.contains_key("status"));

    store.set_filter("status", vec!["active"]);
    store.set_filter("status", Vec::<String>::new());
    assert!(!store.filters().filters.contains_key("status"));

    store.set_filter("created_at", FilterValue::range(Some("2024-01-01"), Some("")));
    assert_eq!(
        store.filters().filters["created_at"],
        FilterValue::Range {
            from: Some("2024-01-01".to_string()),
            to: None
        }
    );
    store.set_filter("created_at", FilterValue::range(None, None));
    assert!(store.filters().filters.is_empty());
}

#[test]
fn test_opaque_keys_are_accepted() {
    let mut store = store();
    store.set_filter("vendor_rating", "5");
    assert_eq!(store.filters().filters["vendor_rating"], FilterValue::from("5"));

    store.remove_filter("vendor_rating");
    assert!(store.filters().filters.is_empty());
}

#[test]
fn test_set_sort_replaces_wholesale_and_resets_page() {
    let mut store = store();
    store.set_sort(Some(Sorting::asc("name")));
    store.set_page(4);

    store.set_sort(Some(Sorting::desc("created_at")));

    assert_eq!(store.filters().sorting, Some(Sorting::desc("created_at")));
    assert_eq!(store.filters().pagination.page, 1);

    store.set_sort(None);
    assert_eq!(store.filters().sorting, None);
}

#[test]
fn test_pagination_setters_clamp_and_touch_only_pagination() {
    let mut store = store();
    store.set_filter("lang_pair", "en-fr");
    store.set_sort(Some(Sorting::asc("name")));

    store.set_page(0);
    assert_eq!(store.filters().pagination.page, 1);
    store.set_page(7);
    store.set_per_page(-3);

    let state = store.filters();
    assert_eq!(state.pagination, Pagination { page: 7, per_page: 1 });
    assert_eq!(state.sorting, Some(Sorting::asc("name")));
    assert_eq!(state.filters.len(), 1);
}

#[test]
fn test_reset_filters_keeps_page_size_only() {
    let mut store = store();
    store.set_per_page(50);
    store.set_filter("lang_pair", "en-fr");
    store.set_sort(Some(Sorting::asc("name")));
    store.set_page(3);

    store.reset_filters();

    let state = store.filters();
    assert_eq!(state.pagination, Pagination { page: 1, per_page: 50 });
    assert_eq!(state.sorting, None);
    assert!(state.filters.is_empty());
}

#[test]
fn test_listeners_run_only_on_change() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut store = store();
    let sink = Rc::clone(&seen);
    store.subscribe(move |state| sink.borrow_mut().push(state.pagination.page));

    store.set_page(2);
    store.set_page(2);
    store.set_filter("status", "open");
    store.set_filter("status", "open");
    // Removing a key that is not set, already on page 1: nothing changes.
    store.set_filter("lang_pair", "");

    assert_eq!(*seen.borrow(), vec![2, 1]);
}

// --- URL Reflection ---

#[test]
fn test_url_reflection_is_shallow_and_removes_cleared_keys() {
    let mut url = SearchParams::parse("tab=details&lang_pair=en-de&page=2");
    let mut store = FilterStore::from_search_params(schema(), &url, Pagination::default());

    store.set_filter("status", vec!["active", "pending"]);
    store.set_sort(Some(Sorting::desc("name")));
    url.apply(&store.search_params_update());

    assert_eq!(url.get("tab"), Some("details"));
    assert_eq!(url.get("lang_pair"), Some("en-de"));
    assert_eq!(url.get_all("status[]"), ["active", "pending"]);
    assert_eq!(url.get("sort_by"), Some("name"));
    assert_eq!(url.get("page"), Some("1"));

    store.set_filter("lang_pair", "");
    store.set_sort(None);
    url.apply(&store.search_params_update());

    assert_eq!(url.get("tab"), Some("details"));
    assert!(!url.contains_key("lang_pair"));
    assert!(!url.contains_key("sort_by"));
    assert!(!url.contains_key("sort_order"));

    // Reloading from the written URL restores the same state.
    let restored = FilterStore::from_search_params(schema(), &url, Pagination::default());
    assert_eq!(restored.filters(), store.filters());
}

#[test]
fn test_text_value_on_list_key_survives_reload() {
    let mut url = SearchParams::new();
    let mut store = FilterStore::new(FilterSchema::new().list("status"), Pagination::default());

    store.set_filter("status", "open");
    url.apply(&store.search_params_update());
    assert_eq!(url.get_all("status[]"), ["open"]);
    assert!(!url.contains_key("status"));

    let restored = FilterStore::from_search_params(
        FilterSchema::new().list("status"),
        &url,
        Pagination::default(),
    );
    assert_eq!(restored.filters(), store.filters());
    assert_eq!(
        project_key("orders", restored.filters()),
        project_key("orders", store.filters())
    );
}

#[test]
fn test_opaque_filter_key_is_removed_from_url_once_cleared() {
    let mut url = SearchParams::new();
    let mut store = store();

    store.set_filter("vendor_rating", "5");
    url.apply(&store.search_params_update());
    assert_eq!(url.get("vendor_rating"), Some("5"));

    store.remove_filter("vendor_rating");
    url.apply(&store.search_params_update());
    assert!(!url.contains_key("vendor_rating"));
}

use serde::de::DeserializeOwned;

use crate::{
    config::AppConfig,
    filters::{FilterSchema, FilterStore},
    models::{FilterState, PaginatedResponse},
    query::{ListQuery, QueryKey, QueryStatus},
    repository::ListRepository,
    router::SearchParams,
};

/// ResourceList
///
/// Everything one paginated screen owns: its filter store and its list query.
/// Mounted from the current URL, refreshed after each interaction, and written back
/// to the URL so reload and back/forward restore the same view.
#[derive(Debug)]
pub struct ResourceList<T> {
    store: FilterStore,
    query: ListQuery<T>,
}

impl<T: Clone + DeserializeOwned> ResourceList<T> {
    pub fn mount(
        resource: &str,
        schema: FilterSchema,
        search: &SearchParams,
        config: &AppConfig,
    ) -> Self {
        let store = FilterStore::from_search_params(schema, search, config.default_pagination());
        tracing::debug!(resource, "list view mounted");
        Self {
            store,
            query: ListQuery::new(resource),
        }
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    /// Mutators go through the store; call `refresh` afterwards.
    pub fn store_mut(&mut self) -> &mut FilterStore {
        &mut self.store
    }

    pub fn filters(&self) -> &FilterState {
        self.store.filters()
    }

    pub fn query(&self) -> &ListQuery<T> {
        &self.query
    }

    pub fn key(&self) -> QueryKey {
        self.query.key_for(self.store.filters())
    }

    pub fn data(&self) -> Option<&PaginatedResponse<T>> {
        self.query.data()
    }

    /// Fetches the page for the current state unless it is already cached.
    pub async fn refresh(&mut self, repo: &dyn ListRepository) -> QueryStatus {
        self.query.load(repo, self.store.filters()).await
    }

    /// Reflects the current state into `search` with a shallow write.
    pub fn reflect_into(&mut self, search: &mut SearchParams) {
        let update = self.store.search_params_update();
        search.apply(&update);
    }
}

use std::sync::Arc;

// --- Module Structure ---

// Authorization: privilege sets, the auth boundary and the navigation gate.
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notifications;
pub mod repository;
pub mod router;

// List-view state: filter store, query-key projection, and the per-screen controller.
pub mod filters;
pub mod list_view;
pub mod query;

// Route declarations and the path-privilege index built from them.
pub mod routes;

// --- Public Re-exports ---

pub use auth::{AuthSession, AuthorizationGate, Decision, PrivilegeSet, StaticSession, authorize};
pub use config::AppConfig;
pub use error::{FetchError, RouteTreeError};
pub use filters::{FilterSchema, FilterStore};
pub use list_view::ResourceList;
pub use models::{FilterState, FilterValue, PaginatedResponse, Pagination, SortOrder, Sorting};
pub use query::{ListQuery, QueryKey, QueryStatus, project_key};
pub use repository::{HttpRepository, ListRepository, MockRepository, RepositoryState};
pub use router::{Location, MemoryRouter, Navigator, SearchParams, SearchParamsUpdate};
pub use routes::{PathPrivilegeMap, RouteNode, build_index};

/// ConsoleState
///
/// The process-wide, read-only data every screen needs: the route index, the fetch
/// boundary and the configuration. Built once at startup and passed explicitly;
/// clones share the same index and repository.
#[derive(Clone)]
pub struct ConsoleState {
    pub routes: Arc<PathPrivilegeMap>,
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl ConsoleState {
    /// Builds the console's route index and bundles it with the given collaborators.
    ///
    /// # Errors
    /// Fails when the route declaration contains a malformed pattern.
    pub fn new(config: AppConfig, repo: RepositoryState) -> Result<Self, RouteTreeError> {
        let routes = build_index(&routes::console::console_routes())?;
        Ok(Self {
            routes: Arc::new(routes),
            repo,
            config,
        })
    }

    /// A gate over this state's route index.
    pub fn gate(&self) -> AuthorizationGate {
        AuthorizationGate::new(Arc::clone(&self.routes))
    }

    /// A memory router over this state's route patterns, positioned at `initial`.
    pub fn router(&self, initial: &str) -> MemoryRouter {
        MemoryRouter::new(Arc::clone(&self.routes), initial)
    }
}

use thiserror::Error;

/// RouteTreeError
///
/// Raised while flattening the route declaration into the path-privilege index.
/// The index is load-bearing for every navigation, so the binary treats any of
/// these as fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTreeError {
    /// A pattern such as `/vendors//edit` with an empty interior segment.
    #[error("route pattern `{pattern}` contains an empty segment")]
    EmptySegment { pattern: String },

    /// A bare `:` segment with no parameter name.
    #[error("route pattern `{pattern}` declares a parameter without a name")]
    EmptyParamName { pattern: String },

    #[error("route pattern `{pattern}` has an invalid parameter name `{name}`")]
    InvalidParamName { pattern: String, name: String },

    #[error("route pattern `{pattern}` declares parameter `{name}` more than once")]
    DuplicateParam { pattern: String, name: String },
}

/// FetchError
///
/// Failure modes of the list fetch boundary. These never escape `ListQuery`;
/// they become its errored status while the previous page stays displayed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for `{resource}` failed")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request for `{resource}` returned status {status}")]
    Status { resource: String, status: u16 },

    #[error("response for `{resource}` could not be decoded")]
    Decode {
        resource: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Used by in-memory repositories to simulate an outage.
    #[error("simulated failure for `{resource}`: {message}")]
    Simulated { resource: String, message: String },
}

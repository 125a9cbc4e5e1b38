/// Route Module Index
///
/// Everything the authorization gate needs to know about the console's URL space:
/// the declarative route tree, its flattened path-privilege index, and the matcher
/// that resolves the active location against that index.
use serde::{Deserialize, Serialize};

use crate::auth::PrivilegeSet;

/// The application's constant route declaration.
pub mod console;

/// Flattening of the route tree into an ordered pattern -> privileges map.
pub mod index;

/// Placeholder substitution and exact-path matching against the index.
pub mod matcher;

pub use index::{PathPrivilegeMap, build_index};
pub use matcher::{RouteParams, extract_params, match_path};

/// RouteNode
///
/// One node of the static route declaration. A node owns its children; the tree is built
/// once at startup and never mutated afterwards.
///
/// `required_privileges` is the node's own requirement. An empty set means the route is
/// public, even when an ancestor requires something.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    pub path: String,
    #[serde(default)]
    pub required_privileges: PrivilegeSet,
    #[serde(default)]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Declares the privileges that grant access to this node (any one of them suffices).
    pub fn requires<I, S>(mut self, privileges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_privileges = privileges.into_iter().collect();
        self
    }

    pub fn child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = RouteNode>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }
}

use std::collections::BTreeSet;

use crate::{auth::PrivilegeSet, error::RouteTreeError};

use super::RouteNode;

/// PathPrivilegeMap
///
/// The flattened route tree: fully-qualified path patterns paired with the privileges
/// their own node declares. Entries keep the pre-order declaration order, which is the
/// tie-break the matcher relies on. Built once and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPrivilegeMap {
    entries: Vec<(String, PrivilegeSet)>,
}

impl PathPrivilegeMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(pattern, required_privileges)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrivilegeSet)> {
        self.entries
            .iter()
            .map(|(pattern, privileges)| (pattern.as_str(), privileges))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(pattern, _)| pattern.as_str())
    }

    /// Looks up a pattern exactly as declared (no parameter substitution).
    pub fn get(&self, pattern: &str) -> Option<&PrivilegeSet> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == pattern)
            .map(|(_, privileges)| privileges)
    }

    // Map-insert semantics: a repeated pattern keeps its slot, the later requirement wins.
    fn insert(&mut self, pattern: String, privileges: PrivilegeSet) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == pattern) {
            Some(slot) => slot.1 = privileges,
            None => self.entries.push((pattern, privileges)),
        }
    }
}

/// build_index
///
/// Walks the route forest depth-first, pre-order, and records every node's effective
/// pattern. Only the path is accumulated from ancestors; each node keeps exactly the
/// privileges it declares, so an empty set below a restricted parent stays public.
///
/// # Errors
/// Returns the first malformed pattern found. Callers building the console index at
/// startup should treat this as fatal.
pub fn build_index(routes: &[RouteNode]) -> Result<PathPrivilegeMap, RouteTreeError> {
    let mut index = PathPrivilegeMap::default();
    for route in routes {
        visit(route, "", &mut index)?;
    }
    tracing::debug!(entries = index.len(), "route index built");
    Ok(index)
}

fn visit(node: &RouteNode, parent: &str, index: &mut PathPrivilegeMap) -> Result<(), RouteTreeError> {
    let pattern = join_path(parent, &node.path);
    validate_pattern(&pattern)?;
    index.insert(pattern.clone(), node.required_privileges.clone());
    for child in &node.children {
        visit(child, &pattern, index)?;
    }
    Ok(())
}

/// Resolves a node's own path against the accumulated parent path.
///
/// Empty paths are index routes and resolve to the parent, absolute paths are taken as-is,
/// relative paths are appended with a single separator. Trailing slashes are dropped.
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    let joined = if child.is_empty() {
        parent.to_string()
    } else if child.starts_with('/') {
        child.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    };

    let trimmed = joined.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn validate_pattern(pattern: &str) -> Result<(), RouteTreeError> {
    if pattern == "/" {
        return Ok(());
    }

    let body = pattern.strip_prefix('/').unwrap_or(pattern);
    let mut seen = BTreeSet::new();

    for segment in body.split('/') {
        if segment.is_empty() {
            return Err(RouteTreeError::EmptySegment {
                pattern: pattern.to_string(),
            });
        }

        let Some(name) = segment.strip_prefix(':') else {
            continue;
        };

        if name.is_empty() {
            return Err(RouteTreeError::EmptyParamName {
                pattern: pattern.to_string(),
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RouteTreeError::InvalidParamName {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(RouteTreeError::DuplicateParam {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

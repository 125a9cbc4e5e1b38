use std::collections::BTreeMap;

use crate::auth::PrivilegeSet;

use super::PathPrivilegeMap;

/// Dynamic route parameters as the router supplies them (`vendorId` -> `42`).
pub type RouteParams = BTreeMap<String, String>;

/// Fills every `:name` segment of `pattern` from `params`.
/// Returns `None` as soon as a segment names a parameter the router did not supply.
pub fn substitute(pattern: &str, params: &RouteParams) -> Option<String> {
    let mut concrete = String::with_capacity(pattern.len());
    for (position, segment) in pattern.split('/').enumerate() {
        if position > 0 {
            concrete.push('/');
        }
        match segment.strip_prefix(':') {
            Some(name) => concrete.push_str(params.get(name)?),
            None => concrete.push_str(segment),
        }
    }
    Some(concrete)
}

/// match_path
///
/// Finds the required privileges for the active location. Each indexed pattern is made
/// concrete with the router's parameters and compared to `pathname` by exact string
/// equality; the first hit in declaration order wins. Entries whose parameters cannot be
/// resolved are skipped.
///
/// `None` means no declared requirement, which the gate treats as unrestricted.
pub fn match_path<'a>(
    pathname: &str,
    params: &RouteParams,
    index: &'a PathPrivilegeMap,
) -> Option<&'a PrivilegeSet> {
    index.iter().find_map(|(pattern, privileges)| {
        let concrete = substitute(pattern, params)?;
        (concrete == pathname).then_some(privileges)
    })
}

/// extract_params
///
/// The router side of matching: binds each `:name` segment of `pattern` to the
/// corresponding segment of `pathname`. Literal segments must be equal and both paths
/// must have the same number of segments.
pub fn extract_params(pattern: &str, pathname: &str) -> Option<RouteParams> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = pathname.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = RouteParams::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) if !actual.is_empty() => {
                params.insert(name.to_string(), actual.to_string());
            }
            Some(_) => return None,
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

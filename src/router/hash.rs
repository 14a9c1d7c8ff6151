//! Hash fragment parsing.
//!
//! Maps a location hash like `#/product/42?tab=reviews` to a logical route name
//! (`product`), positional params (`["42"]`) and query pairs.

use std::collections::BTreeMap;

use serde::Serialize;

/// A parsed hash route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRequest {
    /// Logical route name (first path segment)
    pub name: String,
    /// Remaining path segments
    pub params: Vec<String>,
    pub query: BTreeMap<String, String>,
}

/// Parse a location hash, using `default_route` when the hash names no route.
pub fn parse_hash(hash: &str, default_route: &str) -> RouteRequest {
    let trimmed = hash.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let (path, query) = match trimmed.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (trimmed, None),
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty()).map(String::from);
    let name = segments
        .next()
        .unwrap_or_else(|| default_route.to_string());

    RouteRequest {
        name,
        params: segments.collect(),
        query: query.map(parse_query).unwrap_or_default(),
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

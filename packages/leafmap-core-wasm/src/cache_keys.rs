// Utility functions to generate consistent geocoder cache keys across the application.

/// Normalize a free-text query: trimmed, single-spaced, lowercase.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Generate the cache key for a query sent to a given endpoint: "endpoint|query".
pub fn make_search_key(endpoint: &str, query: &str) -> String {
    format!("{}|{}", endpoint.trim_end_matches('/'), normalize_query(query))
}

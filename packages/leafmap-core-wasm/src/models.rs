// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};

use crate::search::SearchResult;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CacheStats {
    pub search_entries_count: usize,
    pub max_search_entries: usize,
    pub total_requests: usize,
    pub hit_rate: f64,
}

// Answer handed back to the search box
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SearchResponse {
    pub query: String,
    pub from_cache: bool,
    pub results: Vec<SearchResult>,
}

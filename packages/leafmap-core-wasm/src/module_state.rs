use lazy_static::lazy_static;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::models::CacheStats;
use crate::search::SearchResult;

// Cache size limit
pub const SEARCH_CACHE_LIMIT: usize = 100;

// Cached geocoder answer for one normalized query
#[derive(Clone, Debug)]
pub struct CachedSearch {
    pub results: Vec<SearchResult>,
    // Logical access time for eviction
    pub last_used: u64,
}

// Module state to keep cached resources
pub struct ModuleState {
    // Geocoder results keyed by cache_keys::make_search_key
    pub search_results: HashMap<String, CachedSearch>,

    // Configuration for cache limits
    pub max_search_results: usize,

    // Stats
    pub cache_hits: usize,
    pub cache_misses: usize,

    // Monotonic counter standing in for a clock
    tick: u64,
}

// Create a global static instance of the module state
lazy_static! {
    static ref MODULE_STATE: ReentrantMutex<RefCell<ModuleState>> =
        ReentrantMutex::new(RefCell::new(ModuleState::new()));
}

impl Default for ModuleState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            search_results: HashMap::new(),
            max_search_results: SEARCH_CACHE_LIMIT,
            cache_hits: 0,
            cache_misses: 0,
            tick: 0,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let mut borrow = guard.borrow_mut();
        f(&mut borrow)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let borrow = guard.borrow();
        f(&borrow)
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    // Add geocoder results to the cache
    pub fn add_search_results(&mut self, key: String, results: Vec<SearchResult>) {
        if self.max_search_results == 0 {
            return;
        }
        // If we're at capacity, remove the least recently used entry
        if self.search_results.len() >= self.max_search_results
            && !self.search_results.contains_key(&key)
        {
            let oldest_key = self
                .search_results
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());

            if let Some(oldest) = oldest_key {
                self.search_results.remove(&oldest);
            }
        }

        let last_used = self.next_tick();
        self.search_results
            .insert(key, CachedSearch { results, last_used });
    }

    // Get geocoder results from the cache
    pub fn get_search_results(&mut self, key: &str) -> Option<Vec<SearchResult>> {
        let tick = self.next_tick();
        match self.search_results.get_mut(key) {
            Some(entry) => {
                self.cache_hits += 1;
                entry.last_used = tick;
                Some(entry.results.clone())
            }
            None => {
                self.cache_misses += 1;
                None
            }
        }
    }

    // Shrink the cache limit, evicting the oldest entries if needed
    pub fn set_max_search_results(&mut self, max: usize) {
        self.max_search_results = max;
        while self.search_results.len() > max {
            let oldest_key = self
                .search_results
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            match oldest_key {
                Some(oldest) => {
                    self.search_results.remove(&oldest);
                }
                None => break,
            }
        }
    }

    // Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        let total_requests = self.cache_hits + self.cache_misses;
        let hit_rate = if total_requests > 0 {
            self.cache_hits as f64 / total_requests as f64
        } else {
            0.0
        };
        CacheStats {
            search_entries_count: self.search_results.len(),
            max_search_entries: self.max_search_results,
            total_requests,
            hit_rate,
        }
    }

    // Clear all caches
    pub fn clear_all_caches(&mut self) {
        self.search_results.clear();
        // Reset stats
        self.cache_hits = 0;
        self.cache_misses = 0;
    }
}

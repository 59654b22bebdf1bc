use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::error::SolverError;
use crate::models::Solution;

type Outcome = Result<Solution, SolverError>;

/// Remembers solved switchboards by their canonical text.
///
/// The lock is only held for lookups and inserts, never while solving, so
/// two requests racing on the same switchboard may both solve it.
pub struct SolutionCache {
    entries: Option<Mutex<LruCache<String, Outcome>>>,
}

impl SolutionCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        SolutionCache {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn get_or_solve<F>(&self, key: String, solve: F) -> Outcome
    where
        F: FnOnce() -> Outcome,
    {
        let Some(entries) = &self.entries else {
            return solve();
        };

        if let Some(hit) = entries.lock().get(&key) {
            log::debug!("cache hit for {}", key);
            return hit.clone();
        }

        let outcome = solve();
        // Exhausted budgets are not final; a retry may use a larger one.
        if !matches!(outcome, Err(SolverError::ResourceExhausted { .. })) {
            entries.lock().put(key, outcome.clone());
        }
        outcome
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_second_lookup_is_served_from_cache() {
        let cache = SolutionCache::new(4);
        let calls = Cell::new(0);
        let solve = || {
            calls.set(calls.get() + 1);
            Solution::new(vec![1, 2])
        };

        let first = cache.get_or_solve("a".to_string(), solve);
        let second = cache.get_or_solve("a".to_string(), solve);
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_infeasible_outcomes_are_cached() {
        let cache = SolutionCache::new(4);
        let _ = cache.get_or_solve("x".to_string(), || Err(SolverError::infeasible()));
        let again = cache.get_or_solve("x".to_string(), || Solution::new(vec![]));
        assert_eq!(again, Err(SolverError::infeasible()));
    }

    #[test]
    fn test_exhausted_outcomes_are_not_cached() {
        let cache = SolutionCache::new(4);
        let exhausted = SolverError::ResourceExhausted { limit: 1, explored: 1 };
        let _ = cache.get_or_solve("x".to_string(), || Err(exhausted.clone()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_least_recently_used_entry_is_evicted() {
        let cache = SolutionCache::new(1);
        let _ = cache.get_or_solve("a".to_string(), || Solution::new(vec![1]));
        let _ = cache.get_or_solve("b".to_string(), || Solution::new(vec![2]));
        let a = cache.get_or_solve("a".to_string(), || Solution::new(vec![3]));
        assert_eq!(a.unwrap().total, 3);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = SolutionCache::new(0);
        let _ = cache.get_or_solve("a".to_string(), || Solution::new(vec![1]));
        assert!(cache.is_empty());
    }
}

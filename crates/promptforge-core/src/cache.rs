//! In-memory result cache keyed by (prompt, complexity).
//!
//! An explicit component rather than a field buried in the processor, so
//! tests can pre-seed or observe it. Entries live for the lifetime of the
//! cache: no eviction, no TTL, no size bound. Access is serialized by a
//! mutex so concurrent `process` calls on one processor interleave safely;
//! a producing call inserts only after it has fully completed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::{Complexity, ProcessingResult};

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<(String, u8), Arc<ProcessingResult>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match lookup. A hit is a frozen snapshot of the original call.
    pub fn get(&self, prompt: &str, complexity: Complexity) -> Option<Arc<ProcessingResult>> {
        self.entries
            .lock()
            .get(&(prompt.to_string(), complexity.level()))
            .cloned()
    }

    pub fn insert(&self, prompt: &str, complexity: Complexity, result: Arc<ProcessingResult>) {
        self.entries
            .lock()
            .insert((prompt.to_string(), complexity.level()), result);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> Arc<ProcessingResult> {
        Arc::new(ProcessingResult {
            original_prompt: "p".into(),
            complexity_level: Complexity::new(2),
            processing_time: "0.001s".into(),
            subtask_results: vec![],
            final_result: "print()".into(),
        })
    }

    #[test]
    fn returns_the_same_snapshot() {
        let cache = ResultCache::new();
        let result = sample_result();
        cache.insert("p", Complexity::new(2), Arc::clone(&result));

        let hit = cache.get("p", Complexity::new(2)).unwrap();
        assert!(Arc::ptr_eq(&hit, &result));
    }

    #[test]
    fn keys_on_both_prompt_and_complexity() {
        let cache = ResultCache::new();
        cache.insert("p", Complexity::new(2), sample_result());

        assert!(cache.get("p", Complexity::new(3)).is_none());
        assert!(cache.get("q", Complexity::new(2)).is_none());
        assert_eq!(cache.len(), 1);
    }
}

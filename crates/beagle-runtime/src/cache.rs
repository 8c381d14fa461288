use indexmap::IndexMap;
use serde_json::Value;

/// Bounded read cache of one context, keyed by normalized lookup text.
///
/// Any write to the context evicts everything; there is no per-path
/// invalidation. When full, the oldest entry goes first.
#[derive(Debug, Clone)]
pub struct EvaluationCache {
    entries: IndexMap<String, Value>,
    capacity: usize,
}

impl EvaluationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, value: Value) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub fn evict_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use crate::engine::domain::RuleCategory;
use crate::engine::evaluators::Verdict;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    verdict: Verdict,
    stored_at: Instant,
}

/// TTL cache of evaluation verdicts, keyed by category and the hash of
/// the normalized input. Only the verdict payload is cached; call
/// metadata is stamped fresh on every response.
pub struct EvaluationCache {
    ttl: Duration,
    entries: Mutex<HashMap<(RuleCategory, u64), CacheEntry>>,
}

impl EvaluationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, category: RuleCategory, input_hash: u64) -> Option<Verdict> {
        let mut entries = self.entries.lock().ok()?;
        let key = (category, input_hash);
        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.verdict.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, category: RuleCategory, input_hash: u64, verdict: Verdict) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                (category, input_hash),
                CacheEntry {
                    verdict,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every cached verdict for `category`. Called when the rules
    /// behind that category change.
    pub fn invalidate_category(&self, category: RuleCategory) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|(cached, _), _| *cached != category);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

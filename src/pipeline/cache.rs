//! Bounded LRU of built pipelines

use super::AgentPipeline;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Pipelines keyed by model id and system prompt digest
pub struct PipelineCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    tick: u64,
}

struct CacheEntry {
    pipeline: Arc<AgentPipeline>,
    last_used: u64,
}

impl PipelineCache {
    /// A capacity of zero disables caching
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                capacity,
                tick: 0,
            }),
        }
    }

    #[must_use]
    pub fn key(model_id: &str, system_prompt: &str) -> String {
        format!("{model_id}:{:x}", Sha256::digest(system_prompt.as_bytes()))
    }

    /// Return the cached pipeline or build and remember a new one.
    /// `build` runs under the lock and must not block.
    #[must_use]
    pub fn get_or_insert_with(
        &self,
        model_id: &str,
        system_prompt: &str,
        build: impl FnOnce() -> AgentPipeline,
    ) -> Arc<AgentPipeline> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.capacity == 0 {
            return Arc::new(build());
        }

        inner.tick += 1;
        let tick = inner.tick;
        let key = Self::key(model_id, system_prompt);

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.last_used = tick;
            return entry.pipeline.clone();
        }

        if inner.entries.len() >= inner.capacity {
            if let Some(lru_key) = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&lru_key);
            }
        }

        let pipeline = Arc::new(build());
        inner.entries.insert(
            key,
            CacheEntry {
                pipeline: pipeline.clone(),
                last_used: tick,
            },
        );
        tracing::debug!(model = model_id, size = inner.entries.len(), "Pipeline cached");
        pipeline
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use super::RateLimitStore;
use crate::utils::errors::AuthError;

///
/// In-process sliding-window entries - for single-instance deployments and as the
/// permissive-mode fallback. The mutex serialises prune/record pairs per process.
///
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        MemoryRateLimitStore { entries: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn prune_and_count(&self, key: &str, cutoff: DateTime<Utc>) -> Result<u32, AuthError> {
        let mut entries = self.entries.lock();

        match entries.get_mut(key) {
            Some(hits) => {
                hits.retain(|at| *at >= cutoff);
                Ok(hits.len() as u32)
            },
            None => Ok(0),
        }
    }

    async fn oldest(&self, key: &str) -> Result<Option<DateTime<Utc>>, AuthError> {
        let entries = self.entries.lock();

        // Hits are recorded in order, so the front is the oldest.
        Ok(entries.get(key).and_then(|hits| hits.first().copied()))
    }

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut entries = self.entries.lock();
        entries.entry(key.to_string()).or_insert_with(Vec::new).push(at);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), AuthError> {
        let mut entries = self.entries.lock();
        entries.remove(key);
        Ok(())
    }
}

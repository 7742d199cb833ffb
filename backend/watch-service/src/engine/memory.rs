use super::{ConditionalAdd, WatchEngine};
use crate::error::EngineError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-local engine for tests and local runs.
///
/// Each key maps to one DashMap entry, and every operation on a key holds
/// that entry's shard lock for its whole duration, which gives
/// `conditional_add` the same all-or-nothing behaviour as the Redis script.
/// Empty sets are dropped, as Redis does.
#[derive(Debug, Default)]
pub struct InMemoryWatchEngine {
    sets: DashMap<String, HashSet<String>>,
    unavailable: AtomicBool,
}

impl InMemoryWatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys currently holding a non-empty set.
    pub fn key_count(&self) -> usize {
        self.sets.len()
    }

    fn check_available(&self) -> Result<(), EngineError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EngineError::Unavailable(
                "in-memory engine switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl WatchEngine for InMemoryWatchEngine {
    async fn members(&self, key: &str) -> Result<Vec<String>, EngineError> {
        self.check_available()?;
        Ok(self
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, key: &str, member: &str) -> Result<(), EngineError> {
        self.check_available()?;
        self.sets.remove_if_mut(key, |_, set| {
            set.remove(member);
            set.is_empty()
        });
        Ok(())
    }

    async fn conditional_add(
        &self,
        key: &str,
        member: &str,
        limit: usize,
    ) -> Result<ConditionalAdd, EngineError> {
        self.check_available()?;
        let mut set = self.sets.entry(key.to_string()).or_default();
        if set.contains(member) {
            return Ok(ConditionalAdd::AlreadyMember);
        }
        if set.len() >= limit {
            return Ok(ConditionalAdd::LimitReached);
        }
        set.insert(member.to_string());
        Ok(ConditionalAdd::Added)
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.check_available()
    }
}

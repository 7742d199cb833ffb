//! Quota-enforcing membership store.
//!
//! Every operation is exactly one engine call. The quota is enforced inside
//! the engine's atomic conditional add, so the store holds no locks and no
//! mutable state of its own and can be cloned freely across workers.

use crate::engine::{ConditionalAdd, WatchEngine};
use crate::error::{EngineError, Result, WatchError};
use crate::metrics;
use crate::models::{AddOutcome, StreamId, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[derive(Clone)]
pub struct WatchStore {
    engine: Arc<dyn WatchEngine>,
    key_prefix: Arc<str>,
    quota_limit: usize,
}

impl WatchStore {
    pub fn new(
        engine: Arc<dyn WatchEngine>,
        key_prefix: impl Into<Arc<str>>,
        quota_limit: usize,
    ) -> Self {
        Self {
            engine,
            key_prefix: key_prefix.into(),
            quota_limit,
        }
    }

    pub fn quota_limit(&self) -> usize {
        self.quota_limit
    }

    /// Engine key holding the watch set of `user_id`.
    pub fn key_for(&self, user_id: &UserId) -> String {
        format!("{}:{}", self.key_prefix, user_id)
    }

    /// Start watching `stream_id`. Re-adding a watched stream always succeeds,
    /// even when the user is at the limit.
    pub async fn add_stream(&self, user_id: &UserId, stream_id: &StreamId) -> Result<AddOutcome> {
        let key = self.key_for(user_id);
        let reply = timed(
            "add",
            self.engine
                .conditional_add(&key, stream_id.as_str(), self.quota_limit),
        )
        .await?;

        match reply {
            ConditionalAdd::Added => {
                debug!(%user_id, %stream_id, "stream added");
                Ok(AddOutcome::Added)
            }
            ConditionalAdd::AlreadyMember => {
                debug!(%user_id, %stream_id, "stream already watched");
                Ok(AddOutcome::AlreadyWatching)
            }
            ConditionalAdd::LimitReached => Err(WatchError::QuotaExceeded {
                limit: self.quota_limit,
            }),
        }
    }

    /// Streams currently watched by `user_id`, in no particular order.
    pub async fn get_streams(&self, user_id: &UserId) -> Result<Vec<String>> {
        let key = self.key_for(user_id);
        timed("list", self.engine.members(&key)).await
    }

    /// Stop watching `stream_id`. Unknown streams are ignored.
    pub async fn remove_stream(&self, user_id: &UserId, stream_id: &StreamId) -> Result<()> {
        let key = self.key_for(user_id);
        timed("remove", self.engine.remove(&key, stream_id.as_str())).await?;
        debug!(%user_id, %stream_id, "stream removed");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        timed("ping", self.engine.ping()).await
    }
}

async fn timed<T, F>(operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, EngineError>>,
{
    let started = Instant::now();
    let result = call.await;
    metrics::observe_engine_call(operation, result.is_ok(), started.elapsed());
    result.map_err(WatchError::store(operation))
}

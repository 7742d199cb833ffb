//! Backing engine capability used by the watch store.
//!
//! The store only needs three set primitives, one of which must run as a
//! single atomic step on the engine. Keeping the seam this narrow lets the
//! store run against Redis in production and an in-memory engine in tests.

mod memory;
mod redis_engine;

pub use self::memory::InMemoryWatchEngine;
pub use self::redis_engine::{RedisWatchEngine, CONDITIONAL_ADD_SCRIPT};

use crate::error::EngineError;
use async_trait::async_trait;

/// Result of an atomic conditional add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalAdd {
    Added,
    AlreadyMember,
    LimitReached,
}

impl ConditionalAdd {
    /// Decode the integer reply of [`CONDITIONAL_ADD_SCRIPT`].
    pub fn from_reply(reply: i64) -> Result<Self, EngineError> {
        match reply {
            0 => Ok(ConditionalAdd::Added),
            1 => Ok(ConditionalAdd::AlreadyMember),
            2 => Ok(ConditionalAdd::LimitReached),
            other => Err(EngineError::UnexpectedReply(format!(
                "conditional add returned {other}"
            ))),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchEngine: Send + Sync {
    /// All members of the set stored at `key`; empty when the key is absent.
    async fn members(&self, key: &str) -> Result<Vec<String>, EngineError>;

    /// Remove `member` from the set at `key`. Removing a non-member succeeds.
    async fn remove(&self, key: &str, member: &str) -> Result<(), EngineError>;

    /// Add `member` to the set at `key` unless that would grow the set past
    /// `limit`. Existing members are reported as such regardless of size.
    /// Must execute as one indivisible step on the engine.
    async fn conditional_add(
        &self,
        key: &str,
        member: &str,
        limit: usize,
    ) -> Result<ConditionalAdd, EngineError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reply() {
        assert_eq!(ConditionalAdd::from_reply(0).unwrap(), ConditionalAdd::Added);
        assert_eq!(
            ConditionalAdd::from_reply(1).unwrap(),
            ConditionalAdd::AlreadyMember
        );
        assert_eq!(
            ConditionalAdd::from_reply(2).unwrap(),
            ConditionalAdd::LimitReached
        );
        assert!(matches!(
            ConditionalAdd::from_reply(-1),
            Err(EngineError::UnexpectedReply(_))
        ));
    }
}

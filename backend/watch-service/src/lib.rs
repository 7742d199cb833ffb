//! Watch quota service
//!
//! Records which streams a user is currently watching and enforces a per-user
//! cap on concurrently watched streams. The cap is enforced by a single atomic
//! check-and-add executed inside the backing engine, so any number of service
//! instances can share one Redis without coordinating among themselves.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{EngineError, Result, WatchError};
pub use models::{AddOutcome, StreamId, UserId};
pub use store::WatchStore;

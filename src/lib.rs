//! tiercache - a two-tier read-through/write-through cache
//!
//! A bounded in-process LRU tier sits in front of a remote key-value store.
//! Reads fill the local tier from confirmed remote data; writes land locally
//! first and are rolled back if the remote rejects them.
//!
//! The HTTP host service (`api`, `models` and the `tiercache` binary) is
//! behind the default `server` feature; the store itself needs neither
//! axum nor tokio.

#[cfg(feature = "server")]
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
#[cfg(feature = "server")]
pub mod models;
pub mod remote;

#[cfg(feature = "server")]
pub use api::AppState;
pub use cache::{CachedStore, RollbackPolicy, StoreOptions};
pub use config::Config;
pub use error::{CacheError, RemoteError};
pub use remote::{MemoryRemote, RedisRemote, RemoteConfig, RemoteStore};

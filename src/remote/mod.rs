//! Remote Tier Module
//!
//! The authoritative key-value store behind the local cache.
//!
//! # Backends
//! - [`RedisRemote`]: networked redis server over the synchronous redis client
//! - [`MemoryRemote`]: in-process map, for development and tests

mod memory;
mod redis;

use std::sync::Arc;

use crate::error::RemoteError;

pub use self::memory::MemoryRemote;
pub use self::redis::{RedisRemote, RemoteConfig};

// == Remote Store ==
/// Contract the cached store needs from its remote tier.
///
/// Calls are synchronous and carry no retry or timeout policy of their own;
/// whatever the transport does is what the caller gets. `get` returns `None`
/// for an absent key and `Some("")` for a key holding an empty value.
pub trait RemoteStore: Send + Sync {
    /// Reads a key.
    fn get(&self, key: &str) -> Result<Option<String>, RemoteError>;

    /// Writes a key without expiry.
    fn set(&self, key: &str, value: &str) -> Result<(), RemoteError>;

    /// Removes a key. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), RemoteError>;

    /// Releases the underlying connection.
    fn close(&self) -> Result<(), RemoteError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), RemoteError> {
        (**self).delete(key)
    }

    fn close(&self) -> Result<(), RemoteError> {
        (**self).close()
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), RemoteError> {
        (**self).delete(key)
    }

    fn close(&self) -> Result<(), RemoteError> {
        (**self).close()
    }
}

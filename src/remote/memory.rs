//! In-process remote tier, for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use super::RemoteStore;
use crate::error::RemoteError;

/// Authoritative map living in the current process.
///
/// Counts every call it receives and can be switched into an unavailable
/// state in which every call fails, which is how outages are simulated.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    entries: RwLock<HashMap<String, String>>,
    gets: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    unavailable: AtomicBool,
    closed: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reads the stored value without counting as a call.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get_calls(&self) -> u64 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> u64 {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RemoteError::Closed);
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(
                "in-memory remote marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemote {
    fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), RemoteError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries.write().remove(key);
        Ok(())
    }

    fn close(&self) -> Result<(), RemoteError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_is_none() {
        let remote = MemoryRemote::new();
        assert_eq!(remote.get("missing").unwrap(), None);
        assert_eq!(remote.get_calls(), 1);
    }

    #[test]
    fn test_empty_value_is_present() {
        let remote = MemoryRemote::new();
        remote.set("blank", "").unwrap();
        assert_eq!(remote.get("blank").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_unavailable_fails_every_call() {
        let remote = MemoryRemote::new();
        remote.set("k", "v").unwrap();
        remote.set_unavailable(true);

        assert!(matches!(remote.get("k"), Err(RemoteError::Unavailable(_))));
        assert!(matches!(remote.set("k", "w"), Err(RemoteError::Unavailable(_))));
        assert!(matches!(remote.delete("k"), Err(RemoteError::Unavailable(_))));
        assert_eq!(remote.peek("k").as_deref(), Some("v"));

        remote.set_unavailable(false);
        assert_eq!(remote.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let remote = MemoryRemote::new();
        remote.close().unwrap();
        remote.close().unwrap();

        assert!(remote.is_closed());
        assert!(matches!(remote.get("k"), Err(RemoteError::Closed)));
    }
}

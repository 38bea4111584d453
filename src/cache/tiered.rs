//! Cached Store Module
//!
//! Read-through/write-through coordination between the local LRU tier and
//! the authoritative remote tier.

use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, LocalCache, RemoteLocks, StatsRecorder};
use crate::config::{Config, RemoteBackend};
use crate::error::{CacheError, RemoteError, Result};
use crate::remote::{MemoryRemote, RedisRemote, RemoteStore};

// == Rollback Policy ==
/// How the local tier is reconciled after a failed remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// Restore the prior local value if there was one; otherwise keep
    /// whatever the optimistic step left behind.
    #[default]
    RestorePrior,
    /// Restore the prior local value if there was one; otherwise drop the key
    /// so the local tier never holds a value the remote did not accept.
    Strict,
}

impl FromStr for RollbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "restore-prior" => Ok(Self::RestorePrior),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown rollback policy '{}'", other)),
        }
    }
}

// == Store Options ==
/// Construction settings for [`CachedStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Local tier capacity in entries, at least 1
    pub capacity: usize,
    /// Remote lock stripes, at least 1
    pub lock_stripes: usize,
    pub rollback_policy: RollbackPolicy,
}

impl StoreOptions {
    /// Options with the given capacity and defaults otherwise.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::Init(
                "local cache capacity must be positive".to_string(),
            ));
        }
        if self.lock_stripes == 0 {
            return Err(CacheError::Init(
                "lock stripe count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            capacity: 1000,
            lock_stripes: 1,
            rollback_policy: RollbackPolicy::RestorePrior,
        }
    }
}

// == Cached Store ==
/// Key-value store with an in-process LRU tier in front of a remote tier.
///
/// Reads are served locally when possible and populate the local tier only
/// with values the remote confirmed. Writes go to the local tier first, then
/// to the remote; a failed remote write rolls the local tier back according
/// to the [`RollbackPolicy`]. Remote errors reach the caller unchanged.
///
/// Remote calls run under a lock shared by every operation on the same key
/// (every operation at all with one stripe), and that lock also covers the
/// local bookkeeping around the call. Local hits never take it.
pub struct CachedStore {
    local: LocalCache,
    remote: Box<dyn RemoteStore>,
    locks: RemoteLocks,
    stats: StatsRecorder,
    options: StoreOptions,
}

impl CachedStore {
    // == Constructors ==
    /// Wraps an already constructed remote tier.
    pub fn new<R: RemoteStore + 'static>(remote: R, options: StoreOptions) -> Result<Self> {
        Self::from_boxed(Box::new(remote), options)
    }

    /// Builds the remote tier described by `config` and wraps it.
    ///
    /// Fails with [`CacheError::Init`] if the options are invalid or the
    /// remote cannot be reached.
    pub fn connect(config: &Config) -> Result<Self> {
        let options = config.store_options();
        options.validate()?;

        let remote: Box<dyn RemoteStore> = match config.remote_backend {
            RemoteBackend::Redis => Box::new(RedisRemote::connect(&config.remote_config())?),
            RemoteBackend::Memory => Box::new(MemoryRemote::new()),
        };
        Self::from_boxed(remote, options)
    }

    fn from_boxed(remote: Box<dyn RemoteStore>, options: StoreOptions) -> Result<Self> {
        options.validate()?;

        info!(
            capacity = options.capacity,
            lock_stripes = options.lock_stripes,
            rollback_policy = ?options.rollback_policy,
            "Cached store initialized"
        );

        Ok(Self {
            local: LocalCache::new(options.capacity),
            remote,
            locks: RemoteLocks::new(options.lock_stripes),
            stats: StatsRecorder::new(),
            options,
        })
    }

    // == Get ==
    /// Reads `key`, returning `None` when the remote does not have it.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.local.get(key) {
            self.stats.record_hit();
            debug!(key, "Local hit");
            return Ok(Some(value));
        }
        self.stats.record_miss();

        let _guard = self.locks.for_key(key);
        let fetched = self
            .remote
            .get(key)
            .map_err(|err| self.remote_failure("get", key, err))?;

        match &fetched {
            Some(value) => {
                self.insert_local(key, value);
                self.stats.record_population();
                debug!(key, "Populated local tier from remote");
            }
            None => debug!(key, "Key absent in remote"),
        }
        Ok(fetched)
    }

    // == Set ==
    /// Writes `key` to both tiers, local first.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.locks.for_key(key);
        let prior = self.local.peek(key);
        self.insert_local(key, value);

        if let Err(err) = self.remote.set(key, value) {
            let err = self.remote_failure("set", key, err);
            self.rollback(key, prior);
            return Err(err);
        }
        Ok(())
    }

    // == Delete ==
    /// Removes `key` from both tiers, local first.
    pub fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.locks.for_key(key);
        let prior = self.local.remove(key);

        if let Err(err) = self.remote.delete(key) {
            let err = self.remote_failure("delete", key, err);
            self.rollback(key, prior);
            return Err(err);
        }
        Ok(())
    }

    // == Close ==
    /// Releases the remote tier. The local tier is left as is.
    pub fn close(&self) -> Result<()> {
        info!("Closing cached store");
        self.remote.close()?;
        Ok(())
    }

    // == Introspection ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.local.len())
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Whether `key` is currently held by the local tier. Does not touch recency.
    pub fn contains_local(&self, key: &str) -> bool {
        self.local.contains(key)
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // == Helpers ==
    fn insert_local(&self, key: &str, value: &str) {
        if let Some((evicted, _)) = self.local.add(key, value) {
            self.stats.record_eviction();
            debug!(evicted = %evicted, "Evicted least recently used entry");
        }
    }

    fn remote_failure(&self, op: &'static str, key: &str, err: RemoteError) -> CacheError {
        self.stats.record_remote_error();
        warn!(op, key, error = %err, "Remote call failed");
        CacheError::Remote(err)
    }

    fn rollback(&self, key: &str, prior: Option<String>) {
        match (prior, self.options.rollback_policy) {
            (Some(old), _) => {
                self.insert_local(key, &old);
                self.stats.record_rollback();
                warn!(key, "Restored prior local value after remote failure");
            }
            (None, RollbackPolicy::Strict) => {
                if self.local.remove(key).is_some() {
                    self.stats.record_rollback();
                    warn!(key, "Dropped unconfirmed local value after remote failure");
                }
            }
            (None, RollbackPolicy::RestorePrior) => {
                debug!(key, "No prior local value to restore");
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store_with(capacity: usize) -> (CachedStore, Arc<MemoryRemote>) {
        let remote = Arc::new(MemoryRemote::new());
        let store = CachedStore::new(remote.clone(), StoreOptions::with_capacity(capacity)).unwrap();
        (store, remote)
    }

    #[test]
    fn test_zero_capacity_is_init_error() {
        let result = CachedStore::new(MemoryRemote::new(), StoreOptions::with_capacity(0));
        assert!(matches!(result, Err(CacheError::Init(_))));
    }

    #[test]
    fn test_zero_stripes_is_init_error() {
        let options = StoreOptions {
            lock_stripes: 0,
            ..StoreOptions::default()
        };
        let result = CachedStore::new(MemoryRemote::new(), options);
        assert!(matches!(result, Err(CacheError::Init(_))));
    }

    #[test]
    fn test_connect_memory_backend() {
        let config = Config {
            remote_backend: RemoteBackend::Memory,
            local_capacity: 4,
            ..Config::default()
        };
        let store = CachedStore::connect(&config).unwrap();

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.options().capacity, 4);
    }

    #[test]
    fn test_connect_rejects_invalid_options_before_remote() {
        // The redis address is never dialed because validation fails first
        let config = Config {
            local_capacity: 0,
            remote_addr: "127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let result = CachedStore::connect(&config);
        assert!(matches!(result, Err(CacheError::Init(msg)) if msg.contains("capacity")));
    }

    #[test]
    fn test_get_miss_populates() {
        let (store, remote) = store_with(4);
        remote.set("k", "v").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(store.contains_local("k"));

        let stats = store.stats();
        assert_eq!(stats.local_misses, 1);
        assert_eq!(stats.populations, 1);
    }

    #[test]
    fn test_get_absent_does_not_populate() {
        let (store, _remote) = store_with(4);

        assert_eq!(store.get("missing").unwrap(), None);
        assert!(!store.contains_local("missing"));
        assert_eq!(store.stats().populations, 0);
    }

    #[test]
    fn test_empty_value_is_cached() {
        let (store, remote) = store_with(4);
        remote.set("blank", "").unwrap();

        assert_eq!(store.get("blank").unwrap(), Some(String::new()));
        assert!(store.contains_local("blank"));

        // Served locally from now on
        store.get("blank").unwrap();
        assert_eq!(remote.get_calls(), 1);
    }

    #[test]
    fn test_get_remote_error_propagates() {
        let (store, remote) = store_with(4);
        remote.set_unavailable(true);

        let result = store.get("k");
        assert!(matches!(
            result,
            Err(CacheError::Remote(RemoteError::Unavailable(_)))
        ));
        assert_eq!(store.stats().remote_errors, 1);
    }

    #[test]
    fn test_set_failure_without_prior_keeps_optimistic_value() {
        let (store, remote) = store_with(4);
        remote.set_unavailable(true);

        assert!(store.set("k", "v").is_err());
        assert!(store.contains_local("k"));
        assert_eq!(store.stats().rollbacks, 0);
    }

    #[test]
    fn test_strict_policy_drops_unconfirmed_value() {
        let remote = Arc::new(MemoryRemote::new());
        let options = StoreOptions {
            rollback_policy: RollbackPolicy::Strict,
            ..StoreOptions::with_capacity(4)
        };
        let store = CachedStore::new(remote.clone(), options).unwrap();
        remote.set_unavailable(true);

        assert!(store.set("k", "v").is_err());
        assert!(!store.contains_local("k"));
        assert_eq!(store.stats().rollbacks, 1);
    }

    #[test]
    fn test_delete_success_clears_both_tiers() {
        let (store, remote) = store_with(4);
        store.set("k", "v").unwrap();

        store.delete("k").unwrap();
        assert!(!store.contains_local("k"));
        assert_eq!(remote.peek("k"), None);
    }

    #[test]
    fn test_close_delegates_and_keeps_local() {
        let (store, remote) = store_with(4);
        store.set("k", "v").unwrap();

        store.close().unwrap();
        assert!(remote.is_closed());
        assert_eq!(store.local_len(), 1);
        // Local hits still work, remote calls report the closed client
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(matches!(
            store.get("other"),
            Err(CacheError::Remote(RemoteError::Closed))
        ));
    }

    #[test]
    fn test_rollback_policy_parse() {
        assert_eq!("restore-prior".parse::<RollbackPolicy>(), Ok(RollbackPolicy::RestorePrior));
        assert_eq!("RESTORE_PRIOR".parse::<RollbackPolicy>(), Ok(RollbackPolicy::RestorePrior));
        assert_eq!("strict".parse::<RollbackPolicy>(), Ok(RollbackPolicy::Strict));
        assert!("never".parse::<RollbackPolicy>().is_err());
    }
}

//! Configuration Module
//!
//! Loads the cache, remote-tier and host-service settings from environment variables.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{RollbackPolicy, StoreOptions};
use crate::error::{CacheError, Result};
use crate::remote::RemoteConfig;

/// Which remote tier implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteBackend {
    /// Networked redis server
    #[default]
    Redis,
    /// In-process store, for development
    Memory,
}

impl FromStr for RemoteBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown remote backend '{}'", other)),
        }
    }
}

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// A variable that is set but cannot be parsed is an error, never a silent default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the local tier can hold
    pub local_capacity: usize,
    /// Remote tier implementation
    pub remote_backend: RemoteBackend,
    /// Remote server address, `host:port`
    pub remote_addr: String,
    /// Remote auth credential, empty for none
    pub remote_password: String,
    /// Remote logical database
    pub remote_db: i64,
    /// Maximum open remote connections
    pub remote_pool_max: u32,
    /// Remote connections kept open while idle
    pub remote_pool_min_idle: u32,
    /// Seconds an idle remote connection is kept before the pool closes it (0 = never)
    pub remote_idle_timeout: u64,
    /// Seconds allowed for establishing a remote connection
    pub remote_connect_timeout: u64,
    /// Number of remote-operation lock stripes (1 = single global lock)
    pub lock_stripes: usize,
    /// What to do with the local tier when a remote write fails
    pub rollback_policy: RollbackPolicy,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOCAL_CAPACITY` - Local tier entries (default: 1000)
    /// - `REMOTE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REMOTE_ADDR` - Remote address (default: 127.0.0.1:6379)
    /// - `REMOTE_PASSWORD` - Remote password (default: none)
    /// - `REMOTE_DB` - Remote logical database (default: 0)
    /// - `REMOTE_POOL_MAX` - Maximum open remote connections (default: 10)
    /// - `REMOTE_POOL_MIN_IDLE` - Idle remote connections kept open (default: 1)
    /// - `REMOTE_IDLE_TIMEOUT` - Idle timeout in seconds, 0 disables (default: 300)
    /// - `REMOTE_CONNECT_TIMEOUT` - Connect timeout in seconds (default: 5)
    /// - `LOCK_STRIPES` - Remote lock stripes (default: 1)
    /// - `ROLLBACK_POLICY` - `restore-prior` or `strict` (default: restore-prior)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// # Errors
    /// [`CacheError::Init`] naming the first variable whose value does not parse.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            local_capacity: parse_var("LOCAL_CAPACITY", defaults.local_capacity)?,
            remote_backend: parse_var("REMOTE_BACKEND", defaults.remote_backend)?,
            remote_addr: parse_var("REMOTE_ADDR", defaults.remote_addr)?,
            remote_password: parse_var("REMOTE_PASSWORD", defaults.remote_password)?,
            remote_db: parse_var("REMOTE_DB", defaults.remote_db)?,
            remote_pool_max: parse_var("REMOTE_POOL_MAX", defaults.remote_pool_max)?,
            remote_pool_min_idle: parse_var("REMOTE_POOL_MIN_IDLE", defaults.remote_pool_min_idle)?,
            remote_idle_timeout: parse_var("REMOTE_IDLE_TIMEOUT", defaults.remote_idle_timeout)?,
            remote_connect_timeout: parse_var(
                "REMOTE_CONNECT_TIMEOUT",
                defaults.remote_connect_timeout,
            )?,
            lock_stripes: parse_var("LOCK_STRIPES", defaults.lock_stripes)?,
            rollback_policy: parse_var("ROLLBACK_POLICY", defaults.rollback_policy)?,
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
        })
    }

    /// Settings for the cached store itself.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            capacity: self.local_capacity,
            lock_stripes: self.lock_stripes,
            rollback_policy: self.rollback_policy,
        }
    }

    /// Connection settings for the remote tier.
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            addr: self.remote_addr.clone(),
            password: (!self.remote_password.is_empty()).then(|| self.remote_password.clone()),
            db: self.remote_db,
            pool_max_size: self.remote_pool_max,
            pool_min_idle: self.remote_pool_min_idle,
            idle_timeout: Duration::from_secs(self.remote_idle_timeout),
            connect_timeout: Duration::from_secs(self.remote_connect_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_capacity: 1000,
            remote_backend: RemoteBackend::Redis,
            remote_addr: "127.0.0.1:6379".to_string(),
            remote_password: String::new(),
            remote_db: 0,
            remote_pool_max: 10,
            remote_pool_min_idle: 1,
            remote_idle_timeout: 300,
            remote_connect_timeout: 5,
            lock_stripes: 1,
            rollback_policy: RollbackPolicy::RestorePrior,
            server_port: 3000,
        }
    }
}

/// Reads `name`, falling back to `default` only when the variable is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| CacheError::Init(format!("invalid {}='{}': {}", name, raw, e))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(CacheError::Init(format!("invalid {}: {}", name, e))),
    }
}

//! Redis Remote Module
//!
//! Adapter from the remote-tier contract onto a pool of synchronous redis
//! connections managed by `r2d2`.

use std::time::Duration;

use ::redis::{Client, Commands, Connection, RedisError, RedisResult};
use parking_lot::RwLock;
use r2d2::{HandleError, Pool};
use tracing::{info, warn};

use super::RemoteStore;
use crate::error::{CacheError, RemoteError, Result};

// == Remote Config ==
/// Connection settings for the redis tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Server address, `host:port`
    pub addr: String,
    /// Auth credential
    pub password: Option<String>,
    /// Logical database selected after connect
    pub db: i64,
    /// Upper bound on open connections
    pub pool_max_size: u32,
    /// Connections kept open while nothing is using them
    pub pool_min_idle: u32,
    /// Idle connections older than this are closed by the pool. Zero keeps them forever.
    pub idle_timeout: Duration,
    /// Upper bound on waiting for a connection
    pub connect_timeout: Duration,
}

impl RemoteConfig {
    /// Builds the `redis://` URL the client is opened with.
    pub fn url(&self) -> String {
        let addr = self.addr.trim_start_matches("redis://");
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}/{}",
                urlencoding::encode(password),
                addr,
                self.db
            ),
            None => format!("redis://{}/{}", addr, self.db),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pool_max_size == 0 {
            return Err(CacheError::Init("pool max size must be at least 1".to_string()));
        }
        if self.pool_min_idle > self.pool_max_size {
            return Err(CacheError::Init(format!(
                "pool min idle ({}) exceeds pool max size ({})",
                self.pool_min_idle, self.pool_max_size
            )));
        }
        if self.connect_timeout.is_zero() {
            return Err(CacheError::Init("connect timeout must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            db: 0,
            pool_max_size: 10,
            pool_min_idle: 1,
            idle_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Routes background pool failures into the tracing output.
#[derive(Debug)]
struct PoolErrorLogger {
    addr: String,
}

impl HandleError<RedisError> for PoolErrorLogger {
    fn handle_error(&self, error: RedisError) {
        warn!(addr = %self.addr, error = %error, "Remote pool connection failed");
    }
}

// == Redis Remote ==
/// Remote tier backed by a redis connection pool.
///
/// Each command checks a connection out of the pool, so calls for different
/// keys can be in flight at the same time. Connections are pinged on
/// checkout; a connection that broke mid-command is discarded when it is
/// returned and the next command gets a fresh one.
pub struct RedisRemote {
    pool: RwLock<Option<Pool<Client>>>,
    addr: String,
}

impl RedisRemote {
    /// Builds the pool and checks out one connection.
    ///
    /// Fails with [`CacheError::Init`] when the settings are invalid or the
    /// server cannot be reached within `connect_timeout`.
    pub fn connect(config: &RemoteConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::open(config.url().as_str())
            .map_err(|e| CacheError::Init(format!("invalid remote config: {}", e)))?;
        let unreachable =
            |e: r2d2::Error| CacheError::Init(format!("cannot reach remote at {}: {}", config.addr, e));

        let pool = Pool::builder()
            .max_size(config.pool_max_size)
            .min_idle(Some(config.pool_min_idle))
            .idle_timeout((!config.idle_timeout.is_zero()).then_some(config.idle_timeout))
            .connection_timeout(config.connect_timeout)
            .error_handler(Box::new(PoolErrorLogger {
                addr: config.addr.clone(),
            }))
            .build(client)
            .map_err(unreachable)?;
        // min_idle may be zero, in which case nothing has dialed yet
        drop(pool.get().map_err(unreachable)?);

        info!(
            addr = %config.addr,
            db = config.db,
            max_size = config.pool_max_size,
            "Connected to remote tier"
        );

        Ok(Self {
            pool: RwLock::new(Some(pool)),
            addr: config.addr.clone(),
        })
    }

    /// Connections currently open, idle or checked out. Zero after close.
    pub fn connections(&self) -> u32 {
        self.pool
            .read()
            .as_ref()
            .map_or(0, |pool| pool.state().connections)
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> RedisResult<T>,
    ) -> std::result::Result<T, RemoteError> {
        // Clone the handle so close() never waits on network I/O
        let pool = self.pool.read().clone().ok_or(RemoteError::Closed)?;
        let mut conn = pool
            .get()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        op(&mut *conn).map_err(RemoteError::from)
    }
}

impl RemoteStore for RedisRemote {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, RemoteError> {
        self.with_connection(|conn| conn.get(key))
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), RemoteError> {
        self.with_connection(|conn| conn.set(key, value))
    }

    fn delete(&self, key: &str) -> std::result::Result<(), RemoteError> {
        self.with_connection(|conn| conn.del(key))
    }

    fn close(&self) -> std::result::Result<(), RemoteError> {
        if self.pool.write().take().is_some() {
            info!(addr = %self.addr, "Closed remote connection pool");
        }
        Ok(())
    }
}

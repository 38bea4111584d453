//! Response bodies for the host service API

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;

/// A key and the value either tier returned for it.
#[derive(Debug, Clone, Serialize)]
pub struct ValueBody {
    pub key: String,
    pub value: String,
}

/// Mutation acknowledged by a [`WriteAck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOp {
    Set,
    Delete,
}

/// Reply to a write that both tiers accepted.
#[derive(Debug, Clone, Serialize)]
pub struct WriteAck {
    pub key: String,
    pub op: WriteOp,
    /// Entries held by the local tier once the write settled
    pub local_entries: usize,
}

impl WriteAck {
    pub fn new(op: WriteOp, key: impl Into<String>, local_entries: usize) -> Self {
        Self {
            key: key.into(),
            op,
            local_entries,
        }
    }
}

/// Counters plus the derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct StatsBody {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsBody {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Liveness of the host process and the size of its local tier.
/// The remote tier is not contacted.
#[derive(Debug, Clone, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub local_entries: usize,
    pub local_capacity: usize,
    pub checked_at: DateTime<Utc>,
}

impl HealthBody {
    pub fn up(local_entries: usize, local_capacity: usize) -> Self {
        Self {
            status: "up",
            local_entries,
            local_capacity,
            checked_at: Utc::now(),
        }
    }
}

/// `{"error": ...}`, for failures and for absent keys.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn missing_key(key: &str) -> Self {
        Self::new(format!("no value stored for key '{}'", key))
    }
}

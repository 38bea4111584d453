//! Cache Module
//!
//! Two-tier caching: a bounded in-process LRU tier kept consistent with a
//! remote key-value tier.

mod local;
mod locks;
mod stats;
mod tiered;


// Re-export public types
pub use local::LocalCache;
pub use locks::RemoteLocks;
pub use stats::{CacheStats, StatsRecorder};
pub use tiered::{CachedStore, RollbackPolicy, StoreOptions};

// == Public Constants ==
/// Maximum key length in bytes accepted by the host service
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum value size in bytes accepted by the host service
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

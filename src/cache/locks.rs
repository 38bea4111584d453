//! Remote-operation locks
//!
//! Serializes remote calls, either through one global lock or through a set
//! of stripes selected by key hash. Two operations on the same key always
//! share a stripe, so their remote calls never interleave.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use parking_lot::{Mutex, MutexGuard};

/// Striped mutex guarding remote calls and the local bookkeeping around them.
#[derive(Debug)]
pub struct RemoteLocks {
    stripes: Box<[Mutex<()>]>,
}

impl RemoteLocks {
    /// Creates `stripes` locks. One stripe gives a single global lock.
    ///
    /// Callers validate `stripes > 0`.
    pub fn new(stripes: usize) -> Self {
        let stripes: Vec<Mutex<()>> = (0..stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self {
            stripes: stripes.into_boxed_slice(),
        }
    }

    #[inline]
    fn stripe_index(&self, key: &str) -> usize {
        if self.stripes.len() == 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.stripes.len()
    }

    /// Blocks until the stripe owning `key` is free.
    pub fn for_key(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_index(key)].lock()
    }

    pub fn stripes(&self) -> usize {
        self.stripes.len()
    }
}

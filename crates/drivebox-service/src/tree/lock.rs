//! Per-subtree mutation locks.
//!
//! Structural mutations (move, delete) serialize per owner root so two
//! concurrent mutations cannot interleave metadata and physical steps on
//! the same tree. Reads and uploads into distinct folders stay concurrent.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Lazily created mutexes keyed by root folder id.
#[derive(Debug, Default)]
pub struct SubtreeLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl SubtreeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one subtree, waiting if another mutation
    /// holds it.
    pub async fn lock(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let mutex = self.locks.entry(key).or_default().clone();
        mutex.lock_owned().await
    }

    /// Acquire locks for several subtrees in a stable order.
    pub async fn lock_all(&self, keys: &[Uuid]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<Uuid> = keys.to_vec();
        sorted.sort();
        sorted.dedup();
        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.lock(key).await);
        }
        guards
    }
}

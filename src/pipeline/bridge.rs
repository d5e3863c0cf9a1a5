//! Thread boundary between the network receiver and the per-frame update.
//!
//! [`LatestMailbox`] keeps at most one pending value per key. Producers
//! overwrite whatever is waiting for their key; the consumer swaps the whole
//! map out in one step. A consumer that falls behind therefore sees only the
//! newest value for each key instead of a backlog.
//!
//! The lock is held only for a single insert or a single swap, never while
//! the consumer works on the drained values, so a slow host call on the
//! frame thread cannot stall the receiver.

use crate::types::BoneSample;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Counters kept by a mailbox
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Values passed to `publish`
    pub published: u64,
    /// Values overwritten before any drain saw them
    pub coalesced: u64,
    /// Completed `drain_all` calls that returned at least one value
    pub drains: u64,
}

/// Overwrite-latest map shared between producer and consumer threads
pub struct LatestMailbox<K, V> {
    pending: Mutex<HashMap<K, V>>,
    published: AtomicU64,
    coalesced: AtomicU64,
    drains: AtomicU64,
}

impl<K: Eq + Hash, V> LatestMailbox<K, V> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            published: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            drains: AtomicU64::new(0),
        }
    }

    /// Store `value` for `key`, replacing any value not yet drained.
    pub fn publish(&self, key: K, value: V) {
        let replaced = self.lock().insert(key, value).is_some();
        self.published.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.coalesced.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take every pending value, leaving the mailbox empty.
    ///
    /// Keys are unique within one drain; order is unspecified.
    pub fn drain_all(&self) -> Vec<(K, V)> {
        let taken = std::mem::take(&mut *self.lock());
        if !taken.is_empty() {
            self.drains.fetch_add(1, Ordering::Relaxed);
        }
        taken.into_iter().collect()
    }

    /// Number of keys currently waiting
    pub fn pending_len(&self) -> usize {
        self.lock().len()
    }

    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            published: self.published.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
        }
    }

    // A producer that panicked mid-insert leaves a valid map behind, so a
    // poisoned lock is taken over rather than propagated to the other thread.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K: Eq + Hash, V> Default for LatestMailbox<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mailbox of the latest [`BoneSample`] per bone id
pub type FrameBridge = LatestMailbox<String, BoneSample>;

impl LatestMailbox<String, BoneSample> {
    /// Publish a sample under its own bone id
    pub fn publish_sample(&self, sample: BoneSample) {
        self.publish(sample.bone_id.clone(), sample);
    }
}

//! Keyed quiet-period debouncing for bursty interactions.

use std::time::Duration;

use tokio::time::Instant;

struct Pending<K, V> {
    key: K,
    value: V,
    deadline: Instant,
}

/// Holds the latest value per key until the key has been quiet for `quiet`.
///
/// Entries are released in the order their keys first became pending.
pub(crate) struct Debouncer<K, V> {
    quiet: Duration,
    pending: Vec<Pending<K, V>>,
}

impl<K: PartialEq, V> Debouncer<K, V> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Vec::new(),
        }
    }

    /// Start a new entry for `key`.
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        let deadline = now + self.quiet;
        self.pending.push(Pending { key, value, deadline });
    }

    /// Update a pending entry and push its deadline out. Returns `false` if `key` is not pending.
    pub fn update(&mut self, key: &K, now: Instant, apply: impl FnOnce(&mut V)) -> bool {
        match self.pending.iter_mut().find(|p| &p.key == key) {
            Some(entry) => {
                apply(&mut entry.value);
                entry.deadline = now + self.quiet;
                true
            }
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Remove entries whose quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let (due, keep): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.deadline <= now);
        self.pending = keep;
        due.into_iter().map(|p| (p.key, p.value)).collect()
    }

    /// Remove every entry except `key`.
    pub fn take_others(&mut self, key: &K) -> Vec<(K, V)> {
        let (others, keep): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| &p.key != key);
        self.pending = keep;
        others.into_iter().map(|p| (p.key, p.value)).collect()
    }

    pub fn drain(&mut self) -> Vec<(K, V)> {
        self.pending.drain(..).map(|p| (p.key, p.value)).collect()
    }
}

//! Optimistic local updates with rollback to the value seen at request time.
//!
//! `begin` applies a tentative value immediately and hands back a ticket
//! carrying the baseline. `settle` either keeps the tentative value or puts
//! the baseline back. Only the newest pending ticket for a key may roll
//! back; an older ticket settling late is ignored.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticTicket<K, V> {
    pub key: K,
    seq: u64,
    baseline: V,
}

#[derive(Debug)]
pub struct OptimisticStore<K, V> {
    values: HashMap<K, V>,
    pending: HashMap<K, u64>,
    next_seq: u64,
}

impl<K, V> Default for OptimisticStore<K, V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            pending: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K, V> OptimisticStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective value for `key`, if an update is pending or was committed.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    /// Apply `tentative` for `key`. `current` is what the caller shows right
    /// now; it becomes the baseline unless an overlay value already exists.
    pub fn begin(&mut self, key: K, current: V, tentative: V) -> OptimisticTicket<K, V> {
        let baseline = self.values.get(&key).cloned().unwrap_or(current);
        self.next_seq += 1;
        let seq = self.next_seq;
        self.values.insert(key.clone(), tentative);
        self.pending.insert(key.clone(), seq);
        OptimisticTicket { key, seq, baseline }
    }

    /// Resolve a ticket. Returns `true` when a rollback was applied.
    pub fn settle(&mut self, ticket: OptimisticTicket<K, V>, ok: bool) -> bool {
        let is_latest = self.pending.get(&ticket.key) == Some(&ticket.seq);
        if !is_latest {
            tracing::debug!("ignoring superseded optimistic update (seq {})", ticket.seq);
            return false;
        }
        self.pending.remove(&ticket.key);
        if ok {
            return false;
        }
        self.values.insert(ticket.key, ticket.baseline);
        true
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Forget everything, e.g. after a fresh server snapshot was loaded.
    pub fn clear(&mut self) {
        self.values.clear();
        self.pending.clear();
    }
}

//! Stale-response suppression for consumers that issue successive requests.
//!
//! A consumer (for example a browse view changing its category filter) takes a
//! ticket per request and only accepts a completion whose ticket is still the
//! newest one issued for its stream.
//!
//! Library API for embedding callers; the HTTP handlers answer one request per
//! call and have nothing to supersede.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    stream: K,
    generation: u64,
}

#[derive(Debug)]
pub struct LatestRequest<K> {
    generations: Mutex<HashMap<K, u64>>,
}

impl<K> Default for LatestRequest<K> {
    fn default() -> Self {
        Self {
            generations: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Clone + Eq + Hash> LatestRequest<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request on `stream`, superseding every earlier ticket for it.
    pub fn issue(&self, stream: K) -> Ticket<K> {
        let mut generations = self.generations("issue");
        let generation = generations.entry(stream.clone()).or_insert(0);
        *generation += 1;
        Ticket {
            stream,
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.generations("is_current")
            .get(&ticket.stream)
            .is_some_and(|generation| *generation == ticket.generation)
    }

    /// Hand back `value` only when `ticket` has not been superseded.
    pub fn accept<T>(&self, ticket: &Ticket<K>, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }

    fn generations(&self, op: &'static str) -> MutexGuard<'_, HashMap<K, u64>> {
        self.generations.lock().unwrap_or_else(|poisoned| {
            warn!(
                op,
                target_module = "cache::latest",
                result = "poisoned_recovered",
                "Recovered from poisoned generation map"
            );
            poisoned.into_inner()
        })
    }
}

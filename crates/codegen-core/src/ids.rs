//! Identifier allocation.
//!
//! Every entity (component, property, resource) receives an integer id drawn
//! from one shared `IdGenerator`. The generator is owned by an engine (or a
//! test) rather than living in a global, so independent engines never share
//! counters.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Integer entity id. Unique within one `IdGenerator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Monotonic id allocator guarded by an exclusive lock.
#[derive(Debug)]
pub struct IdGenerator {
    next: Mutex<u64>,
}

impl IdGenerator {
    /// Ids start at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Mutex::new(first),
        }
    }

    /// Shared handle, the form registries hold.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn next_id(&self) -> EntityId {
        let mut next = self.next.lock();
        let id = *next;
        *next += 1;
        EntityId(id)
    }

    /// The id the next call will return.
    pub fn peek(&self) -> EntityId {
        EntityId(*self.next.lock())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

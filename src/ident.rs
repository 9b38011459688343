//! Identifier generation boundary.
//!
//! The provider is a trait so tests can substitute a deterministic
//! implementation for the random one.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::node::NodeId;

/// Source of fresh node identifiers.
///
/// Implementations must make collisions practically impossible; the engine
/// still re-checks every id against the live store and re-rolls a bounded
/// number of times before giving up with `DuplicateId`.
pub trait IdProvider: Send + Sync {
    fn fresh_id(&self) -> NodeId;
}

// ============================================================
// REAL IMPLEMENTATION
// ============================================================

/// Random v4 UUID identifiers.
#[derive(Debug, Default)]
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn fresh_id(&self) -> NodeId {
        NodeId::new(Uuid::new_v4().to_string())
    }
}

// ============================================================
// DETERMINISTIC IMPLEMENTATION (tests, reproducible fixtures)
// ============================================================

/// Monotonic counter identifiers (`prefix-1`, `prefix-2`, ...).
#[derive(Debug)]
pub struct SerialProvider {
    prefix: String,
    counter: AtomicU64,
}

impl SerialProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SerialProvider {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdProvider for SerialProvider {
    fn fresh_id(&self) -> NodeId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        NodeId::new(format!("{}-{}", self.prefix, n))
    }
}

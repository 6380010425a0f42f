//! Association consistency engine.
//!
//! # Responsibility
//! - Keep every denormalized roster mirrored with the employee-side fields.
//! - Compute minimal edits between old and desired association sets.
//!
//! # Invariants
//! - No other code path writes association fields of counterpart documents.
//! - Removal tolerates a missing counterpart; addition does not.
//! - Each manager step is idempotent and safe to re-run.

pub mod department_link;
pub mod diff;
pub mod error;
pub mod project_roster;
pub mod skill_spec;
pub mod task_ownership;
pub mod training_roster;

use crate::model::EntityId;

/// A task that changed hands during assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub task_id: EntityId,
    pub previous_owner: EntityId,
}

/// What one roster sync actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Counterparts the employee was detached from.
    pub removed: Vec<EntityId>,
    /// Counterparts the employee was attached to.
    pub added: Vec<EntityId>,
    /// Removal targets that no longer exist.
    pub missing: Vec<EntityId>,
    /// Ownership takeovers (tasks only).
    pub evicted: Vec<Eviction>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
            && self.added.is_empty()
            && self.missing.is_empty()
            && self.evicted.is_empty()
    }
}

//! HRM document model.
//!
//! # Responsibility
//! - Define the six persisted record kinds and their embedded rosters.
//! - Bind every record kind to its store collection via [`Document`].
//!
//! # Invariants
//! - Every document is identified by a positive [`EntityId`] unique within
//!   its collection.
//! - Association fields hold ids only; no record embeds another record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub mod department;
pub mod employee;
pub mod project;
pub mod skill;
pub mod task;
pub mod training;

/// Integer identity shared by all collections.
pub type EntityId = i64;

/// Record kinds known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Employee,
    Department,
    Project,
    Task,
    Training,
    Skill,
}

impl EntityKind {
    /// Store collection name for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Department => "department",
            Self::Project => "project",
            Self::Task => "task",
            Self::Training => "training",
            Self::Skill => "skill",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A record that lives in one store collection.
pub trait Document: Serialize + DeserializeOwned {
    /// Collection binding for this record type.
    const KIND: EntityKind;

    /// Stable identity within the collection.
    fn id(&self) -> EntityId;
}

//! Task document carrying the exclusive owner reference.

use super::{Document, EntityId, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub name: String,
    /// Owning employee. `None` means unassigned.
    #[serde(default)]
    pub manager_id: Option<EntityId>,
}

impl Document for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Ownership state derived from `Task::manager_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOwnership {
    Unassigned,
    Assigned(EntityId),
}

impl Task {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            manager_id: None,
        }
    }

    pub fn ownership(&self) -> TaskOwnership {
        match self.manager_id {
            Some(owner) => TaskOwnership::Assigned(owner),
            None => TaskOwnership::Unassigned,
        }
    }
}

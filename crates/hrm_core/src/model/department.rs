//! Department document and its employee roster.

use super::{Document, EntityId, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub employee_id: EntityId,
}

/// Department with a denormalized employee roster.
///
/// # Invariants
/// - `manager_id`, when set, is present in `employee_roster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub employee_roster: Vec<RosterEntry>,
    #[serde(default)]
    pub manager_id: Option<EntityId>,
}

impl Document for Department {
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Department {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            employee_roster: Vec::new(),
            manager_id: None,
        }
    }

    pub fn has_member(&self, employee_id: EntityId) -> bool {
        self.employee_roster
            .iter()
            .any(|entry| entry.employee_id == employee_id)
    }

    /// Appends `employee_id` unless already rostered.
    pub fn enroll(&mut self, employee_id: EntityId) -> bool {
        if self.has_member(employee_id) {
            return false;
        }
        self.employee_roster.push(RosterEntry { employee_id });
        true
    }

    /// Removes `employee_id` and vacates the manager seat if they held it.
    pub fn withdraw(&mut self, employee_id: EntityId) -> bool {
        let before = self.employee_roster.len();
        self.employee_roster
            .retain(|entry| entry.employee_id != employee_id);
        let mut changed = self.employee_roster.len() != before;
        if self.manager_id == Some(employee_id) {
            self.manager_id = None;
            changed = true;
        }
        changed
    }
}

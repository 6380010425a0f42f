//! Training document. Unlike projects, members are a flat id list.

use super::{Document, EntityId, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<EntityId>,
}

impl Document for Training {
    const KIND: EntityKind = EntityKind::Training;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Training {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, employee_id: EntityId) -> bool {
        if self.members.contains(&employee_id) {
            return false;
        }
        self.members.push(employee_id);
        true
    }

    pub fn remove_member(&mut self, employee_id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|&member| member != employee_id);
        self.members.len() != before
    }
}

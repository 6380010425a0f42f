//! Project document; members are wrapper records.

use super::{Document, EntityId, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub employee_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
}

impl Document for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Project {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn has_member(&self, employee_id: EntityId) -> bool {
        self.members
            .iter()
            .any(|member| member.employee_id == employee_id)
    }

    pub fn add_member(&mut self, employee_id: EntityId) -> bool {
        if self.has_member(employee_id) {
            return false;
        }
        self.members.push(ProjectMember { employee_id });
        true
    }

    pub fn remove_member(&mut self, employee_id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.employee_id != employee_id);
        self.members.len() != before
    }
}

//! Skill catalog entry. Never holds a back-reference to employees.

use super::{Document, EntityId, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub kind: String,
}

impl Document for Skill {
    const KIND: EntityKind = EntityKind::Skill;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Skill {
    pub fn new(id: EntityId, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
        }
    }
}

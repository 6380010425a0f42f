//! Employee document, the initiating side of every association sync.
//!
//! # Invariants
//! - `skills` holds at most one entry per skill id, proficiency in `1..=5`.
//! - `projects`, `owned_tasks` and `trainings` mirror the counterpart
//!   rosters after every successful sync.

use super::{Document, EntityId, EntityKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lowest accepted proficiency level.
pub const MIN_PROFICIENCY: u8 = 1;
/// Highest accepted proficiency level.
pub const MAX_PROFICIENCY: u8 = 5;

/// One declared skill with its proficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLevel {
    pub skill_id: EntityId,
    pub proficiency: u8,
}

/// Wrapper record pointing at a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub project_id: EntityId,
}

/// Wrapper record pointing at an owned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub task_id: EntityId,
}

/// Wrapper record pointing at a training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRef {
    pub training_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub department_id: Option<EntityId>,
    /// Unix epoch milliseconds.
    pub joined_at: i64,
    #[serde(default)]
    pub skills: Vec<SkillLevel>,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
    #[serde(default)]
    pub owned_tasks: Vec<TaskRef>,
    #[serde(default)]
    pub trainings: Vec<TrainingRef>,
}

impl Document for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Employee {
    /// Creates an employee with no associations.
    pub fn new(id: EntityId, name: impl Into<String>, joined_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            department_id: None,
            joined_at,
            skills: Vec::new(),
            projects: Vec::new(),
            owned_tasks: Vec::new(),
            trainings: Vec::new(),
        }
    }

    pub fn project_ids(&self) -> BTreeSet<EntityId> {
        self.projects.iter().map(|item| item.project_id).collect()
    }

    pub fn owned_task_ids(&self) -> BTreeSet<EntityId> {
        self.owned_tasks.iter().map(|item| item.task_id).collect()
    }

    pub fn training_ids(&self) -> BTreeSet<EntityId> {
        self.trainings.iter().map(|item| item.training_id).collect()
    }

    pub fn set_project_ids(&mut self, ids: &BTreeSet<EntityId>) {
        self.projects = ids
            .iter()
            .map(|&project_id| ProjectRef { project_id })
            .collect();
    }

    pub fn set_owned_task_ids(&mut self, ids: &BTreeSet<EntityId>) {
        self.owned_tasks = ids.iter().map(|&task_id| TaskRef { task_id }).collect();
    }

    pub fn set_training_ids(&mut self, ids: &BTreeSet<EntityId>) {
        self.trainings = ids
            .iter()
            .map(|&training_id| TrainingRef { training_id })
            .collect();
    }

    /// Records ownership of `task_id` unless already held.
    pub fn claim_task(&mut self, task_id: EntityId) -> bool {
        if self.owned_tasks.iter().any(|item| item.task_id == task_id) {
            return false;
        }
        self.owned_tasks.push(TaskRef { task_id });
        true
    }

    /// Drops one owned task reference. Returns whether anything changed.
    pub fn release_task(&mut self, task_id: EntityId) -> bool {
        let before = self.owned_tasks.len();
        self.owned_tasks.retain(|item| item.task_id != task_id);
        self.owned_tasks.len() != before
    }

    /// Returns the declared proficiency for `skill_id`, if any.
    pub fn proficiency(&self, skill_id: EntityId) -> Option<u8> {
        self.skills
            .iter()
            .find(|level| level.skill_id == skill_id)
            .map(|level| level.proficiency)
    }
}

#[cfg(test)]
mod tests {
    use super::Employee;
    use std::collections::BTreeSet;

    #[test]
    fn serializes_with_camel_case_wrappers() {
        let mut employee = Employee::new(4, "Ada", 1_700_000_000_000);
        employee.set_project_ids(&BTreeSet::from([2]));
        let json = serde_json::to_value(&employee).expect("employee should serialize");
        assert_eq!(json["departmentId"], serde_json::Value::Null);
        assert_eq!(json["projects"][0]["projectId"], 2);
        assert_eq!(json["joinedAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn release_task_reports_change() {
        let mut employee = Employee::new(1, "Lin", 0);
        employee.set_owned_task_ids(&BTreeSet::from([5, 6]));
        assert!(employee.release_task(5));
        assert!(!employee.release_task(5));
        assert_eq!(employee.owned_task_ids(), BTreeSet::from([6]));
    }
}

//! Skill-based employee matching.
//!
//! # Responsibility
//! - Parse requirement lists in the same `skillId:level` form as skill
//!   declarations.
//! - Return employees meeting every requirement.
//!
//! # Invariants
//! - Unknown skill ids are reported as `NotFound`, never silently ignored.
//! - An empty requirement list matches every employee.

use crate::association::error::{AssocResult, AssociationError};
use crate::association::skill_spec::parse_skill_pairs;
use crate::model::employee::{Employee, MAX_PROFICIENCY, MIN_PROFICIENCY};
use crate::model::skill::Skill;
use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::DocumentStore;
use log::info;
use std::collections::BTreeMap;

/// Minimum proficiency required on one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillRequirement {
    pub skill_id: EntityId,
    pub min_proficiency: u8,
}

/// Parses `"skillId:minLevel,..."` into requirements.
///
/// Repeated skill ids keep the strictest level.
pub fn parse_requirements(spec: &str) -> AssocResult<Vec<SkillRequirement>> {
    let mut strictest: BTreeMap<EntityId, u8> = BTreeMap::new();
    for (skill_id, level) in parse_skill_pairs(spec)? {
        let min_proficiency = u8::try_from(level)
            .ok()
            .filter(|value| (MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(value))
            .ok_or_else(|| {
                AssociationError::validation(
                    "requiredSkills",
                    format!(
                        "level for skill {skill_id} must be in {MIN_PROFICIENCY}..={MAX_PROFICIENCY}, got {level}"
                    ),
                )
            })?;
        let entry = strictest.entry(skill_id).or_insert(min_proficiency);
        *entry = (*entry).max(min_proficiency);
    }
    Ok(strictest
        .into_iter()
        .map(|(skill_id, min_proficiency)| SkillRequirement {
            skill_id,
            min_proficiency,
        })
        .collect())
}

/// Read-only matching service over employee skill lists.
pub struct SkillMatchService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> SkillMatchService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Employees whose proficiency meets every requirement, ordered by id.
    pub fn match_by_skills(&self, requirements: &[SkillRequirement]) -> AssocResult<Vec<Employee>> {
        for requirement in requirements {
            if self.store.get::<Skill>(requirement.skill_id)?.is_none() {
                return Err(AssociationError::not_found(
                    EntityKind::Skill,
                    requirement.skill_id,
                ));
            }
        }

        let matched: Vec<Employee> = self
            .store
            .find_all::<Employee>()?
            .into_iter()
            .filter(|employee| meets_all(employee, requirements))
            .collect();
        info!(
            "event=skill_match module=service status=ok requirements={} matched={}",
            requirements.len(),
            matched.len()
        );
        Ok(matched)
    }

    /// Parses `spec` and matches in one call.
    pub fn match_by_spec(&self, spec: &str) -> AssocResult<Vec<Employee>> {
        let requirements = parse_requirements(spec)?;
        self.match_by_skills(&requirements)
    }
}

fn meets_all(employee: &Employee, requirements: &[SkillRequirement]) -> bool {
    requirements.iter().all(|requirement| {
        employee
            .proficiency(requirement.skill_id)
            .is_some_and(|level| level >= requirement.min_proficiency)
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_requirements, SkillRequirement};
    use crate::association::error::AssociationError;

    #[test]
    fn repeated_requirement_keeps_strictest_level() {
        let parsed = parse_requirements("2:1,1:3,2:4").expect("parse");
        assert_eq!(
            parsed,
            vec![
                SkillRequirement {
                    skill_id: 1,
                    min_proficiency: 3
                },
                SkillRequirement {
                    skill_id: 2,
                    min_proficiency: 4
                },
            ]
        );
    }

    #[test]
    fn level_outside_scale_is_rejected() {
        let err = parse_requirements("1:0").expect_err("zero level");
        assert!(matches!(
            err,
            AssociationError::Validation {
                field: "requiredSkills",
                ..
            }
        ));
    }

    #[test]
    fn blank_spec_has_no_requirements() {
        assert!(parse_requirements("  ").expect("blank").is_empty());
    }
}

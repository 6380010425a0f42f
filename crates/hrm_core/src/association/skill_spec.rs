//! Skill-proficiency declarations: `"skillId:proficiency,..."`.
//!
//! # Responsibility
//! - Parse the compact declaration grammar.
//! - Validate entries against the Skill catalog and the proficiency range.
//! - Deduplicate by skill id, keeping the first occurrence.
//!
//! # Invariants
//! - Every entry is validated, including ones later dropped as duplicates.
//! - Output order follows first occurrence in the input.

use crate::association::error::{AssocResult, AssociationError};
use crate::model::employee::{SkillLevel, MAX_PROFICIENCY, MIN_PROFICIENCY};
use crate::model::skill::Skill;
use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::DocumentStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

const SKILLS_FIELD: &str = "skills";

static NON_NEGATIVE_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("valid integer regex"));

/// Splits a declaration string into raw `(skill_id, level)` pairs.
///
/// Blank input yields no pairs. Each segment must be two non-negative
/// integers separated by `:`, with no whitespace inside a segment.
pub fn parse_skill_pairs(spec: &str) -> AssocResult<Vec<(EntityId, i64)>> {
    if spec.trim().is_empty() {
        return Ok(Vec::new());
    }

    spec.split(',').map(parse_segment).collect()
}

/// Parses, validates and deduplicates a declaration string.
pub fn validate_skills<S: DocumentStore>(store: &S, spec: &str) -> AssocResult<Vec<SkillLevel>> {
    let mut seen = BTreeSet::new();
    let mut levels = Vec::new();

    for (skill_id, proficiency) in parse_skill_pairs(spec)? {
        let skill = store
            .get::<Skill>(skill_id)?
            .ok_or_else(|| AssociationError::not_found(EntityKind::Skill, skill_id))?;
        let proficiency = checked_proficiency(&skill, proficiency)?;

        if seen.insert(skill_id) {
            levels.push(SkillLevel {
                skill_id,
                proficiency,
            });
        }
    }

    Ok(levels)
}

/// Renders a skill list back into declaration form (`"1:3,2:2"`).
pub fn format_skill_spec(levels: &[SkillLevel]) -> String {
    levels
        .iter()
        .map(|level| format!("{}:{}", level.skill_id, level.proficiency))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_segment(segment: &str) -> AssocResult<(EntityId, i64)> {
    let malformed = || {
        AssociationError::validation(
            SKILLS_FIELD,
            format!("malformed segment `{segment}`; expected `skillId:proficiency` (e.g. 1:4)"),
        )
    };

    let mut parts = segment.split(':');
    let (Some(id_text), Some(level_text), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    if !NON_NEGATIVE_INT_RE.is_match(id_text) || !NON_NEGATIVE_INT_RE.is_match(level_text) {
        return Err(malformed());
    }

    let skill_id = id_text.parse::<EntityId>().map_err(|_| malformed())?;
    let level = level_text.parse::<i64>().map_err(|_| malformed())?;
    Ok((skill_id, level))
}

fn checked_proficiency(skill: &Skill, value: i64) -> AssocResult<u8> {
    match u8::try_from(value) {
        Ok(level) if (MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(&level) => Ok(level),
        _ => Err(AssociationError::validation(
            SKILLS_FIELD,
            format!(
                "proficiency out of range for skill `{}` (id {}): {value} not in {MIN_PROFICIENCY}..={MAX_PROFICIENCY}",
                skill.name, skill.id
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_skill_spec, parse_skill_pairs};
    use crate::association::error::AssociationError;
    use crate::model::employee::SkillLevel;

    #[test]
    fn blank_input_parses_to_nothing() {
        assert!(parse_skill_pairs("").unwrap().is_empty());
        assert!(parse_skill_pairs("   ").unwrap().is_empty());
    }

    #[test]
    fn pairs_keep_input_order_and_duplicates() {
        let pairs = parse_skill_pairs("1:3,1:5,2:2").unwrap();
        assert_eq!(pairs, vec![(1, 3), (1, 5), (2, 2)]);
    }

    #[test]
    fn whitespace_inside_segments_is_malformed() {
        for input in ["1:3, 1:5 ,2:2", " 1 : 3 ", "1 :3", "1: 3"] {
            let err = parse_skill_pairs(input).unwrap_err();
            match err {
                AssociationError::Validation { field, reason } => {
                    assert_eq!(field, "skills");
                    assert!(reason.contains("malformed segment"), "{input}: {reason}");
                }
                other => panic!("unexpected error for {input}: {other}"),
            }
        }
    }

    #[test]
    fn malformed_segments_are_named() {
        for input in ["1", "1:2:3", "a:3", "1:-2", "1:3,", ":4"] {
            let err = parse_skill_pairs(input).unwrap_err();
            match err {
                AssociationError::Validation { field, reason } => {
                    assert_eq!(field, "skills");
                    assert!(reason.contains("malformed segment"), "{input}: {reason}");
                }
                other => panic!("unexpected error for {input}: {other}"),
            }
        }
    }

    #[test]
    fn oversized_numbers_are_format_errors() {
        let err = parse_skill_pairs("99999999999999999999:1").unwrap_err();
        assert!(matches!(err, AssociationError::Validation { .. }));
    }

    #[test]
    fn format_round_trips_declaration_shape() {
        let levels = vec![
            SkillLevel {
                skill_id: 1,
                proficiency: 3,
            },
            SkillLevel {
                skill_id: 2,
                proficiency: 2,
            },
        ];
        assert_eq!(format_skill_spec(&levels), "1:3,2:2");
        assert_eq!(format_skill_spec(&[]), "");
    }
}

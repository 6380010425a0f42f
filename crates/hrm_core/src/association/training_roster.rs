//! Employee <-> Training roster sync. Training rosters are flat id lists.

use crate::association::diff::diff_ids;
use crate::association::error::{AssocResult, AssociationError};
use crate::association::SyncReport;
use crate::model::employee::Employee;
use crate::model::training::Training;
use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::{modify, DocumentStore};
use log::{error, info};
use std::collections::BTreeSet;

const MEMBER_FIELD: &str = "members";

/// Mirrors `Employee::trainings` into `Training::members`.
pub struct TrainingRoster<'s, S: DocumentStore> {
    store: &'s S,
}

impl<'s, S: DocumentStore> TrainingRoster<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Trainings the employee currently attends, from either side.
    pub fn current_ids(&self, employee: &Employee) -> AssocResult<BTreeSet<EntityId>> {
        let mut ids = employee.training_ids();
        ids.extend(self.member_of(employee.id)?);
        Ok(ids)
    }

    /// Trainings whose roster lists `employee_id`, ignoring the employee side.
    pub fn member_of(&self, employee_id: EntityId) -> AssocResult<BTreeSet<EntityId>> {
        Ok(self
            .store
            .find_by_field::<Training>(MEMBER_FIELD, employee_id)?
            .into_iter()
            .map(|training| training.id)
            .collect())
    }

    pub fn ensure_all_exist(&self, ids: &BTreeSet<EntityId>) -> AssocResult<()> {
        for &id in ids {
            if self.store.get::<Training>(id)?.is_none() {
                return Err(AssociationError::not_found(EntityKind::Training, id));
            }
        }
        Ok(())
    }

    pub fn sync(
        &self,
        employee_id: EntityId,
        old_ids: &BTreeSet<EntityId>,
        new_ids: &BTreeSet<EntityId>,
    ) -> AssocResult<SyncReport> {
        let diff = diff_ids(old_ids, new_ids);
        let mut report = SyncReport::default();

        for &training_id in &diff.removed {
            let result = modify(self.store, training_id, |training: &mut Training| {
                training.remove_member(employee_id)
            })?;
            if result.is_missing() {
                info!(
                    "event=training_leave module=association status=skipped employee_id={employee_id} training_id={training_id} reason=training_missing"
                );
                report.missing.push(training_id);
            } else {
                report.removed.push(training_id);
            }
        }

        for &training_id in &diff.added {
            let result = modify(self.store, training_id, |training: &mut Training| {
                training.add_member(employee_id)
            })?;
            if result.is_missing() {
                error!(
                    "event=training_join module=association status=error employee_id={employee_id} training_id={training_id} error_code=not_found"
                );
                return Err(AssociationError::not_found(
                    EntityKind::Training,
                    training_id,
                ));
            }
            report.added.push(training_id);
        }

        info!(
            "event=training_sync module=association status=ok employee_id={employee_id} removed={:?} added={:?}",
            report.removed, report.added
        );
        Ok(report)
    }
}

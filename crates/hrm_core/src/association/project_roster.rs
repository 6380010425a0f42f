//! Employee <-> Project many-to-many roster sync.

use crate::association::diff::diff_ids;
use crate::association::error::{AssocResult, AssociationError};
use crate::association::SyncReport;
use crate::model::employee::Employee;
use crate::model::project::Project;
use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::{modify, DocumentStore};
use log::{error, info};
use std::collections::BTreeSet;

const MEMBER_FIELD: &str = "members.employeeId";

/// Mirrors `Employee::projects` into `Project::members`.
pub struct ProjectRoster<'s, S: DocumentStore> {
    store: &'s S,
}

impl<'s, S: DocumentStore> ProjectRoster<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Projects the employee currently belongs to, from either side.
    pub fn current_ids(&self, employee: &Employee) -> AssocResult<BTreeSet<EntityId>> {
        let mut ids = employee.project_ids();
        ids.extend(self.member_of(employee.id)?);
        Ok(ids)
    }

    /// Projects whose roster lists `employee_id`, ignoring the employee side.
    pub fn member_of(&self, employee_id: EntityId) -> AssocResult<BTreeSet<EntityId>> {
        Ok(self
            .store
            .find_by_field::<Project>(MEMBER_FIELD, employee_id)?
            .into_iter()
            .map(|project| project.id)
            .collect())
    }

    /// Fails with `NotFound` on the first id that does not resolve.
    pub fn ensure_all_exist(&self, ids: &BTreeSet<EntityId>) -> AssocResult<()> {
        for &id in ids {
            if self.store.get::<Project>(id)?.is_none() {
                return Err(AssociationError::not_found(EntityKind::Project, id));
            }
        }
        Ok(())
    }

    /// Applies the diff between `old_ids` and `new_ids` to project rosters.
    ///
    /// Removals run first and stay committed if a later addition fails.
    pub fn sync(
        &self,
        employee_id: EntityId,
        old_ids: &BTreeSet<EntityId>,
        new_ids: &BTreeSet<EntityId>,
    ) -> AssocResult<SyncReport> {
        let diff = diff_ids(old_ids, new_ids);
        let mut report = SyncReport::default();

        for &project_id in &diff.removed {
            let result = modify(self.store, project_id, |project: &mut Project| {
                project.remove_member(employee_id)
            })?;
            if result.is_missing() {
                info!(
                    "event=project_leave module=association status=skipped employee_id={employee_id} project_id={project_id} reason=project_missing"
                );
                report.missing.push(project_id);
            } else {
                report.removed.push(project_id);
            }
        }

        for &project_id in &diff.added {
            let result = modify(self.store, project_id, |project: &mut Project| {
                project.add_member(employee_id)
            })?;
            if result.is_missing() {
                error!(
                    "event=project_join module=association status=error employee_id={employee_id} project_id={project_id} error_code=not_found"
                );
                return Err(AssociationError::not_found(EntityKind::Project, project_id));
            }
            report.added.push(project_id);
        }

        info!(
            "event=project_sync module=association status=ok employee_id={employee_id} removed={:?} added={:?}",
            report.removed, report.added
        );
        Ok(report)
    }
}

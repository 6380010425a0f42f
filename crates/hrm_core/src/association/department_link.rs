//! Employee <-> Department membership mirroring.
//!
//! # Invariants
//! - Removal from the old department is committed before the new one is
//!   loaded; a missing new department leaves the employee detached.
//! - Removing the department manager vacates `manager_id`.

use crate::association::error::{AssocResult, AssociationError};
use crate::model::department::Department;
use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::{modify, DocumentStore, Modified};
use log::{error, info};
use std::collections::BTreeSet;

const ROSTER_FIELD: &str = "employeeRoster.employeeId";
const MANAGER_FIELD: &str = "managerId";

/// Keeps `Employee::department_id` and `Department::employee_roster` in step.
pub struct DepartmentLinks<'s, S: DocumentStore> {
    store: &'s S,
}

impl<'s, S: DocumentStore> DepartmentLinks<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Attaches a new employee to `department_id`, if any.
    pub fn bind(&self, employee_id: EntityId, department_id: Option<EntityId>) -> AssocResult<()> {
        self.rebind(employee_id, None, department_id)
    }

    /// Moves an employee between departments.
    pub fn rebind(
        &self,
        employee_id: EntityId,
        old_department_id: Option<EntityId>,
        new_department_id: Option<EntityId>,
    ) -> AssocResult<()> {
        if old_department_id == new_department_id {
            return Ok(());
        }

        if let Some(old_id) = old_department_id {
            self.detach(employee_id, old_id)?;
        }

        if let Some(new_id) = new_department_id {
            let result = modify(self.store, new_id, |department: &mut Department| {
                department.enroll(employee_id)
            })?;
            if result.is_missing() {
                error!(
                    "event=department_bind module=association status=error employee_id={employee_id} department_id={new_id} error_code=not_found"
                );
                return Err(AssociationError::not_found(EntityKind::Department, new_id));
            }
            info!(
                "event=department_bind module=association status=ok employee_id={employee_id} department_id={new_id} written={}",
                result.was_written()
            );
        }

        Ok(())
    }

    /// Detaches a deleted employee from their department.
    pub fn unbind_on_delete(
        &self,
        employee_id: EntityId,
        department_id: Option<EntityId>,
    ) -> AssocResult<()> {
        match department_id {
            Some(id) => self.detach(employee_id, id),
            None => Ok(()),
        }
    }

    /// Fails with `NotFound` unless `department_id` resolves.
    pub fn ensure_exists(&self, department_id: EntityId) -> AssocResult<()> {
        match self.store.get::<Department>(department_id)? {
            Some(_) => Ok(()),
            None => Err(AssociationError::not_found(
                EntityKind::Department,
                department_id,
            )),
        }
    }

    /// Departments that roster `employee_id` or seat them as manager.
    pub fn referencing(&self, employee_id: EntityId) -> AssocResult<BTreeSet<EntityId>> {
        let mut ids: BTreeSet<EntityId> = self
            .store
            .find_by_field::<Department>(ROSTER_FIELD, employee_id)?
            .into_iter()
            .map(|department| department.id)
            .collect();
        ids.extend(
            self.store
                .find_by_field::<Department>(MANAGER_FIELD, employee_id)?
                .into_iter()
                .map(|department| department.id),
        );
        Ok(ids)
    }

    fn detach(&self, employee_id: EntityId, department_id: EntityId) -> AssocResult<()> {
        let result = modify(self.store, department_id, |department: &mut Department| {
            department.withdraw(employee_id)
        })?;
        match result {
            Modified::Missing => info!(
                "event=department_unbind module=association status=skipped employee_id={employee_id} department_id={department_id} reason=department_missing"
            ),
            Modified::Unchanged(_) => {}
            Modified::Written(department) => info!(
                "event=department_unbind module=association status=ok employee_id={employee_id} department_id={department_id} manager_vacant={}",
                department.manager_id.is_none()
            ),
        }
        Ok(())
    }
}

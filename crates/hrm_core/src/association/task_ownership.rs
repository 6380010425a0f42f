//! Exclusive task ownership with eviction.
//!
//! # Responsibility
//! - Drive each task through `Unassigned -> Assigned(employee)`.
//! - Displace the prior owner when a task is reassigned.
//!
//! # Invariants
//! - A task has at most one owner; the latest assignment wins.
//! - `unassign` only clears ownership held by the caller's employee.
//! - `sync` validates every requested task before mutating anything.

use crate::association::diff::diff_ids;
use crate::association::error::{AssocResult, AssociationError};
use crate::association::{Eviction, SyncReport};
use crate::model::employee::Employee;
use crate::model::task::{Task, TaskOwnership};
use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::{modify, DocumentStore, Modified, StoreError, Versioned};
use log::{info, warn};
use std::collections::BTreeSet;

const OWNER_FIELD: &str = "managerId";

/// Result of one `assign` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The task was unassigned and now belongs to the employee.
    Assigned,
    /// The employee already owned the task; nothing was written.
    AlreadyOwned,
    /// The task was taken over from another employee.
    Evicted { previous_owner: EntityId },
}

/// Result of one `unassign` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnassignOutcome {
    Released,
    /// Someone else (or nobody) owns the task; left untouched.
    NotOwner { current_owner: Option<EntityId> },
    TaskMissing,
}

/// Maintains `Task::manager_id` and `Employee::owned_tasks`.
pub struct TaskOwners<'s, S: DocumentStore> {
    store: &'s S,
}

impl<'s, S: DocumentStore> TaskOwners<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Tasks whose `manager_id` currently points at `employee_id`.
    pub fn owned_by(&self, employee_id: EntityId) -> AssocResult<BTreeSet<EntityId>> {
        Ok(self
            .store
            .find_by_field::<Task>(OWNER_FIELD, employee_id)?
            .into_iter()
            .map(|task| task.id)
            .collect())
    }

    /// Checks that every id is positive and names an existing task.
    pub fn validate_targets(&self, task_ids: &BTreeSet<EntityId>) -> AssocResult<()> {
        if let Some(&bad) = task_ids.iter().find(|&&id| id <= 0) {
            return Err(AssociationError::validation(
                "taskIds",
                format!("task id must be a positive integer, got {bad}"),
            ));
        }
        for &task_id in task_ids {
            if self.store.get::<Task>(task_id)?.is_none() {
                return Err(AssociationError::not_found(EntityKind::Task, task_id));
            }
        }
        Ok(())
    }

    /// Makes `employee_id` the sole owner of `task_id`.
    pub fn assign(&self, task_id: EntityId, employee_id: EntityId) -> AssocResult<AssignOutcome> {
        let attempts = self.store.write_attempts().max(1);
        let mut attempt = 0;
        let outcome = loop {
            attempt += 1;
            let Versioned {
                document: mut task,
                version,
            } = self
                .store
                .load::<Task>(task_id)?
                .ok_or_else(|| AssociationError::not_found(EntityKind::Task, task_id))?;

            let outcome = match task.ownership() {
                TaskOwnership::Assigned(owner) if owner == employee_id => {
                    break AssignOutcome::AlreadyOwned;
                }
                TaskOwnership::Assigned(previous_owner) => {
                    self.evict(&task, previous_owner, employee_id)?;
                    AssignOutcome::Evicted { previous_owner }
                }
                TaskOwnership::Unassigned => AssignOutcome::Assigned,
            };

            task.manager_id = Some(employee_id);
            match self.store.replace(&task, version) {
                Ok(_) => break outcome,
                Err(StoreError::Conflict { .. }) if attempt < attempts => {
                    warn!(
                        "event=task_assign module=association status=retry task_id={task_id} employee_id={employee_id} attempt={attempt}"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        };

        modify(self.store, employee_id, |employee: &mut Employee| {
            employee.claim_task(task_id)
        })?;
        info!(
            "event=task_assign module=association status=ok task_id={task_id} employee_id={employee_id} outcome={outcome:?}"
        );
        Ok(outcome)
    }

    /// Clears ownership of `task_id` if, and only if, `employee_id` holds it.
    pub fn unassign(
        &self,
        task_id: EntityId,
        employee_id: EntityId,
    ) -> AssocResult<UnassignOutcome> {
        let result = modify(self.store, task_id, |task: &mut Task| {
            if task.manager_id == Some(employee_id) {
                task.manager_id = None;
                true
            } else {
                false
            }
        })?;

        let outcome = match result {
            Modified::Missing => UnassignOutcome::TaskMissing,
            Modified::Written(_) => UnassignOutcome::Released,
            Modified::Unchanged(task) => UnassignOutcome::NotOwner {
                current_owner: task.manager_id,
            },
        };

        modify(self.store, employee_id, |employee: &mut Employee| {
            employee.release_task(task_id)
        })?;
        info!(
            "event=task_unassign module=association status=ok task_id={task_id} employee_id={employee_id} outcome={outcome:?}"
        );
        Ok(outcome)
    }

    /// Reconciles ownership from `old_ids` to `new_ids`.
    pub fn sync(
        &self,
        employee_id: EntityId,
        old_ids: &BTreeSet<EntityId>,
        new_ids: &BTreeSet<EntityId>,
    ) -> AssocResult<SyncReport> {
        self.validate_targets(new_ids)?;

        let diff = diff_ids(old_ids, new_ids);
        let mut report = SyncReport::default();

        for &task_id in &diff.removed {
            match self.unassign(task_id, employee_id)? {
                UnassignOutcome::TaskMissing => report.missing.push(task_id),
                _ => report.removed.push(task_id),
            }
        }

        for &task_id in &diff.added {
            if let AssignOutcome::Evicted { previous_owner } = self.assign(task_id, employee_id)? {
                report.evicted.push(Eviction {
                    task_id,
                    previous_owner,
                });
            }
            report.added.push(task_id);
        }

        Ok(report)
    }

    fn evict(&self, task: &Task, previous_owner: EntityId, new_owner: EntityId) -> AssocResult<()> {
        let result = modify(self.store, previous_owner, |employee: &mut Employee| {
            employee.release_task(task.id)
        })?;
        warn!(
            "event=task_evict module=association status=ok task_id={} task_name={:?} previous_owner={} new_owner={} previous_owner_present={}",
            task.id,
            task.name,
            previous_owner,
            new_owner,
            !result.is_missing()
        );
        Ok(())
    }
}

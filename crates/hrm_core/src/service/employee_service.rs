//! Employee lifecycle use-case service.
//!
//! # Responsibility
//! - Expose create/update/delete entry points for employees.
//! - Sequence the relationship managers and persist the employee record.
//! - Coordinate delete cascades through the durable intent journal.
//!
//! # Invariants
//! - Create validates every reference before the first write.
//! - Update validates skills and task ids before the first write; later
//!   steps commit independently and are not rolled back on failure.
//! - The employee document is deleted only after every cascade step ran
//!   without a store failure.

use crate::association::department_link::DepartmentLinks;
use crate::association::error::{AssocResult, AssociationError};
use crate::association::project_roster::ProjectRoster;
use crate::association::skill_spec::{format_skill_spec, validate_skills};
use crate::association::task_ownership::TaskOwners;
use crate::association::training_roster::TrainingRoster;
use crate::association::SyncReport;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::{EntityId, EntityKind};
use crate::repo::cascade_journal::{CascadeIntent, CascadeJournal, IntentId};
use crate::repo::document_store::{modify, DocumentStore};
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEPARTMENT_FIELD: &str = "departmentId";

/// Profile fields of a new or edited employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub name: String,
    /// Epoch milliseconds. `None` means "now" on create, "unchanged" on edit.
    pub joined_at: Option<i64>,
}

impl EmployeeDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joined_at: None,
        }
    }
}

/// Desired association state for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredAssociations {
    pub department_id: Option<EntityId>,
    pub project_ids: BTreeSet<EntityId>,
    pub task_ids: BTreeSet<EntityId>,
    pub training_ids: BTreeSet<EntityId>,
    /// `"skillId:proficiency,..."`; blank clears the skill list.
    pub skills_spec: String,
}

/// What a delete cascade touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub intent_id: IntentId,
    pub employee_id: EntityId,
    pub departments: Vec<EntityId>,
    pub projects: SyncReport,
    pub tasks: SyncReport,
    pub trainings: SyncReport,
}

/// How an employee's department reference resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentStatus {
    Assigned { department_id: EntityId, name: String },
    Unassigned,
    /// The referenced department no longer exists.
    Deleted { department_id: EntityId },
}

/// Read model for employee detail views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDetail {
    pub employee: Employee,
    pub department: DepartmentStatus,
    /// Skill list in declaration form, ready for round-tripping.
    pub skills_spec: String,
    /// Projects whose roster lists the employee.
    pub project_ids: BTreeSet<EntityId>,
    /// Tasks whose `managerId` is the employee.
    pub task_ids: BTreeSet<EntityId>,
    /// Trainings whose roster lists the employee.
    pub training_ids: BTreeSet<EntityId>,
}

/// Employee service facade over a document store.
pub struct EmployeeService<S: DocumentStore + CascadeJournal> {
    store: S,
}

impl<S: DocumentStore + CascadeJournal> EmployeeService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates one employee and attaches every requested association.
    ///
    /// Returns the newly issued employee id.
    pub fn create_employee(
        &self,
        draft: &EmployeeDraft,
        desired: &DesiredAssociations,
    ) -> AssocResult<EntityId> {
        let started_at = Instant::now();
        info!("event=employee_create module=service status=start");
        let result = self.create_employee_inner(draft, desired);
        log_outcome("employee_create", started_at, &result);
        result
    }

    /// Reconciles an existing employee with `desired`.
    pub fn update_employee(
        &self,
        employee_id: EntityId,
        desired: &DesiredAssociations,
    ) -> AssocResult<Employee> {
        let started_at = Instant::now();
        info!("event=employee_update module=service status=start employee_id={employee_id}");
        let result = self.update_employee_inner(employee_id, desired);
        log_outcome("employee_update", started_at, &result);
        result
    }

    /// Replaces name and, when given, the join timestamp.
    pub fn update_employee_profile(
        &self,
        employee_id: EntityId,
        draft: &EmployeeDraft,
    ) -> AssocResult<Employee> {
        let name = normalize_name(&draft.name)?;
        modify(&self.store, employee_id, |employee: &mut Employee| {
            employee.name = name.clone();
            if let Some(joined_at) = draft.joined_at {
                employee.joined_at = joined_at;
            }
            true
        })?
        .into_document()
        .ok_or_else(|| AssociationError::not_found(EntityKind::Employee, employee_id))
    }

    /// Deletes an employee after detaching them from every counterpart.
    pub fn delete_employee(&self, employee_id: EntityId) -> AssocResult<CascadeReport> {
        let started_at = Instant::now();
        info!("event=employee_delete module=service status=start employee_id={employee_id}");
        let result = self.delete_employee_inner(employee_id);
        log_outcome("employee_delete", started_at, &result);
        result
    }

    /// Issues the next employee id. Ids are never reused.
    pub fn next_employee_id(&self) -> AssocResult<EntityId> {
        Ok(self.store.next_id(EntityKind::Employee)?)
    }

    /// Delete cascades recorded but not yet completed, oldest first.
    pub fn pending_cascades(&self) -> AssocResult<Vec<CascadeIntent>> {
        Ok(self.store.pending_intents()?)
    }

    /// Re-runs delete cascades that never completed.
    ///
    /// Every pending intent is attempted. Returns ids of employees whose
    /// cascade finished, or the first failure once all intents were tried.
    /// Failed intents stay pending.
    pub fn resume_pending_cascades(&self) -> AssocResult<Vec<EntityId>> {
        let mut finished = Vec::new();
        let mut first_failure: Option<AssociationError> = None;
        for intent in self.pending_cascades()? {
            info!(
                "event=cascade_resume module=service status=start intent_id={} employee_id={}",
                intent.intent_id, intent.employee_id
            );
            match self.resume_intent(&intent) {
                Ok(()) => finished.push(intent.employee_id),
                Err(err) => {
                    error!(
                        "event=cascade_resume module=service status=error intent_id={} employee_id={} error_code={} error={err}",
                        intent.intent_id,
                        intent.employee_id,
                        err.code()
                    );
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }
        match first_failure {
            Some(err) => Err(err),
            None => Ok(finished),
        }
    }

    /// Gets one employee by id.
    pub fn get_employee(&self, employee_id: EntityId) -> AssocResult<Option<Employee>> {
        Ok(self.store.get::<Employee>(employee_id)?)
    }

    /// Lists all employees ordered by id.
    pub fn list_employees(&self) -> AssocResult<Vec<Employee>> {
        Ok(self.store.find_all::<Employee>()?)
    }

    /// Case-insensitive substring search on names; blank lists everyone.
    pub fn find_employees_by_name(&self, query: &str) -> AssocResult<Vec<Employee>> {
        let needle = query.trim().to_lowercase();
        let employees = self.store.find_all::<Employee>()?;
        if needle.is_empty() {
            return Ok(employees);
        }
        Ok(employees
            .into_iter()
            .filter(|employee| employee.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Employees whose `departmentId` is `department_id`, ordered by id.
    pub fn employees_in_department(&self, department_id: EntityId) -> AssocResult<Vec<Employee>> {
        DepartmentLinks::new(&self.store).ensure_exists(department_id)?;
        Ok(self
            .store
            .find_by_field::<Employee>(DEPARTMENT_FIELD, department_id)?)
    }

    /// Loads one employee with resolved department, skill declaration and
    /// the association ids held on the counterpart side.
    pub fn employee_detail(&self, employee_id: EntityId) -> AssocResult<EmployeeDetail> {
        let employee = self.require_employee(employee_id)?;
        let department = match employee.department_id {
            None => DepartmentStatus::Unassigned,
            Some(department_id) => match self.store.get::<Department>(department_id)? {
                Some(department) => DepartmentStatus::Assigned {
                    department_id,
                    name: department.name,
                },
                None => DepartmentStatus::Deleted { department_id },
            },
        };
        let skills_spec = format_skill_spec(&employee.skills);
        let project_ids = ProjectRoster::new(&self.store).member_of(employee_id)?;
        let task_ids = TaskOwners::new(&self.store).owned_by(employee_id)?;
        let training_ids = TrainingRoster::new(&self.store).member_of(employee_id)?;
        Ok(EmployeeDetail {
            employee,
            department,
            skills_spec,
            project_ids,
            task_ids,
            training_ids,
        })
    }

    fn create_employee_inner(
        &self,
        draft: &EmployeeDraft,
        desired: &DesiredAssociations,
    ) -> AssocResult<EntityId> {
        let departments = DepartmentLinks::new(&self.store);
        let projects = ProjectRoster::new(&self.store);
        let tasks = TaskOwners::new(&self.store);
        let trainings = TrainingRoster::new(&self.store);

        let name = normalize_name(&draft.name)?;
        let skills = validate_skills(&self.store, &desired.skills_spec)?;
        if let Some(department_id) = desired.department_id {
            departments.ensure_exists(department_id)?;
        }
        projects.ensure_all_exist(&desired.project_ids)?;
        tasks.validate_targets(&desired.task_ids)?;
        trainings.ensure_all_exist(&desired.training_ids)?;

        let employee_id = self.next_employee_id()?;
        let mut employee = Employee::new(
            employee_id,
            name,
            draft.joined_at.unwrap_or_else(now_epoch_ms),
        );
        employee.skills = skills;
        apply_associations(&mut employee, desired);
        self.store.upsert(&employee)?;

        departments.bind(employee_id, desired.department_id)?;
        projects.sync(employee_id, &BTreeSet::new(), &desired.project_ids)?;
        tasks.sync(employee_id, &BTreeSet::new(), &desired.task_ids)?;
        trainings.sync(employee_id, &BTreeSet::new(), &desired.training_ids)?;

        Ok(employee_id)
    }

    fn update_employee_inner(
        &self,
        employee_id: EntityId,
        desired: &DesiredAssociations,
    ) -> AssocResult<Employee> {
        let departments = DepartmentLinks::new(&self.store);
        let projects = ProjectRoster::new(&self.store);
        let tasks = TaskOwners::new(&self.store);
        let trainings = TrainingRoster::new(&self.store);

        let current = self.require_employee(employee_id)?;
        let skills = validate_skills(&self.store, &desired.skills_spec)?;
        tasks.validate_targets(&desired.task_ids)?;

        let old_projects = projects.current_ids(&current)?;
        let old_tasks = tasks.owned_by(employee_id)?;
        let old_trainings = trainings.current_ids(&current)?;

        departments.rebind(employee_id, current.department_id, desired.department_id)?;
        projects.sync(employee_id, &old_projects, &desired.project_ids)?;
        let task_report = tasks.sync(employee_id, &old_tasks, &desired.task_ids)?;
        trainings.sync(employee_id, &old_trainings, &desired.training_ids)?;

        if !task_report.evicted.is_empty() {
            info!(
                "event=employee_update module=service status=progress employee_id={employee_id} evictions={}",
                task_report.evicted.len()
            );
        }

        modify(&self.store, employee_id, |employee: &mut Employee| {
            employee.skills = skills.clone();
            apply_associations(employee, desired);
            true
        })?
        .into_document()
        .ok_or_else(|| AssociationError::not_found(EntityKind::Employee, employee_id))
    }

    fn resume_intent(&self, intent: &CascadeIntent) -> AssocResult<()> {
        let employee = match self.store.get::<Employee>(intent.employee_id)? {
            Some(employee) => employee,
            // Document already gone; sweep counterparts by reverse lookup.
            None => Employee::new(intent.employee_id, String::new(), 0),
        };
        self.run_cascade(intent.intent_id, &employee)?;
        Ok(())
    }

    fn delete_employee_inner(&self, employee_id: EntityId) -> AssocResult<CascadeReport> {
        let employee = self.require_employee(employee_id)?;
        let intent = self.store.open_intent(employee_id)?;
        self.run_cascade(intent.intent_id, &employee)
    }

    fn run_cascade(&self, intent_id: IntentId, employee: &Employee) -> AssocResult<CascadeReport> {
        let departments = DepartmentLinks::new(&self.store);
        let projects = ProjectRoster::new(&self.store);
        let tasks = TaskOwners::new(&self.store);
        let trainings = TrainingRoster::new(&self.store);
        let employee_id = employee.id;
        let nothing = BTreeSet::new();
        let mut first_failure: Option<AssociationError> = None;

        let mut department_ids: BTreeSet<EntityId> = employee.department_id.into_iter().collect();
        let department_step = departments
            .referencing(employee_id)
            .and_then(|referencing| {
                department_ids.extend(referencing);
                department_ids
                    .iter()
                    .try_for_each(|&id| departments.unbind_on_delete(employee_id, Some(id)))
            });
        record_failure(&mut first_failure, "department", employee_id, department_step);

        let project_report = projects
            .current_ids(employee)
            .and_then(|old| projects.sync(employee_id, &old, &nothing));
        let project_report = record_failure(&mut first_failure, "project", employee_id, project_report);

        let mut old_tasks = employee.owned_task_ids();
        let task_report = tasks.owned_by(employee_id).and_then(|owned| {
            old_tasks.extend(owned);
            tasks.sync(employee_id, &old_tasks, &nothing)
        });
        let task_report = record_failure(&mut first_failure, "task", employee_id, task_report);

        let training_report = trainings
            .current_ids(employee)
            .and_then(|old| trainings.sync(employee_id, &old, &nothing));
        let training_report =
            record_failure(&mut first_failure, "training", employee_id, training_report);

        if let Some(err) = first_failure {
            warn!(
                "event=cascade_incomplete module=service status=error intent_id={intent_id} employee_id={employee_id} error={err}"
            );
            return Err(err);
        }

        self.store.delete::<Employee>(employee_id)?;
        self.store.complete_intent(intent_id)?;

        Ok(CascadeReport {
            intent_id,
            employee_id,
            departments: department_ids.into_iter().collect(),
            projects: project_report.unwrap_or_default(),
            tasks: task_report.unwrap_or_default(),
            trainings: training_report.unwrap_or_default(),
        })
    }

    fn require_employee(&self, employee_id: EntityId) -> AssocResult<Employee> {
        self.store
            .get::<Employee>(employee_id)?
            .ok_or_else(|| AssociationError::not_found(EntityKind::Employee, employee_id))
    }
}

fn apply_associations(employee: &mut Employee, desired: &DesiredAssociations) {
    employee.department_id = desired.department_id;
    employee.set_project_ids(&desired.project_ids);
    employee.set_owned_task_ids(&desired.task_ids);
    employee.set_training_ids(&desired.training_ids);
}

fn normalize_name(value: &str) -> AssocResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AssociationError::validation(
            "name",
            "employee name must not be blank",
        ));
    }
    Ok(trimmed.to_string())
}

fn record_failure<T>(
    slot: &mut Option<AssociationError>,
    step: &'static str,
    employee_id: EntityId,
    result: AssocResult<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!(
                "event=cascade_step module=service status=error step={step} employee_id={employee_id} error_code={} error={err}",
                err.code()
            );
            if slot.is_none() {
                *slot = Some(err);
            }
            None
        }
    }
}

fn log_outcome<T>(event: &'static str, started_at: Instant, result: &AssocResult<T>) {
    match result {
        Ok(_) => info!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=service status=error duration_ms={} error_code={} error={err}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

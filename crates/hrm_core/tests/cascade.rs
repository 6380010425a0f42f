use hrm_core::repo::document_store::modify;
use hrm_core::{
    open_db_in_memory, AssociationError, CascadeJournal, Department, DesiredAssociations,
    DocumentStore, Employee, EmployeeDraft, EmployeeService, EntityId, EntityKind, Project,
    SqliteDocumentStore, Task, Training,
};
use std::collections::BTreeSet;

fn seed(store: &SqliteDocumentStore<'_>) {
    store.upsert(&Department::new(1, "R&D")).unwrap();
    store.upsert(&Project::new(1, "Apollo")).unwrap();
    store.upsert(&Project::new(2, "Gemini")).unwrap();
    store.upsert(&Task::new(1, "Design")).unwrap();
    store.upsert(&Task::new(2, "Review")).unwrap();
    store.upsert(&Training::new(1, "Onboarding")).unwrap();
}

fn everything() -> DesiredAssociations {
    DesiredAssociations {
        department_id: Some(1),
        project_ids: BTreeSet::from([1, 2]),
        task_ids: BTreeSet::from([1, 2]),
        training_ids: BTreeSet::from([1]),
        skills_spec: String::new(),
    }
}

fn assert_no_references(store: &SqliteDocumentStore<'_>, employee_id: EntityId) {
    let department = store.get::<Department>(1).unwrap().unwrap();
    assert!(!department.has_member(employee_id));
    assert_ne!(department.manager_id, Some(employee_id));
    for project in store.find_all::<Project>().unwrap() {
        assert!(!project.has_member(employee_id), "project {}", project.id);
    }
    for task in store.find_all::<Task>().unwrap() {
        assert_ne!(task.manager_id, Some(employee_id), "task {}", task.id);
    }
    for training in store.find_all::<Training>().unwrap() {
        assert!(!training.members.contains(&employee_id), "training {}", training.id);
    }
}

#[test]
fn delete_detaches_employee_everywhere() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seed(&store);
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let employee_id = service
        .create_employee(&EmployeeDraft::new("Margaret"), &everything())
        .unwrap();
    let colleague = service
        .create_employee(
            &EmployeeDraft::new("Hedy"),
            &DesiredAssociations {
                department_id: Some(1),
                project_ids: BTreeSet::from([1]),
                ..DesiredAssociations::default()
            },
        )
        .unwrap();
    modify(&store, 1, |department: &mut Department| {
        department.manager_id = Some(employee_id);
        true
    })
    .unwrap();

    let report = service.delete_employee(employee_id).unwrap();
    assert_eq!(report.employee_id, employee_id);
    assert_eq!(report.departments, vec![1]);
    assert_eq!(report.projects.removed, vec![1, 2]);
    assert_eq!(report.tasks.removed, vec![1, 2]);
    assert_eq!(report.trainings.removed, vec![1]);

    assert!(store.get::<Employee>(employee_id).unwrap().is_none());
    assert_no_references(&store, employee_id);
    assert_eq!(store.get::<Department>(1).unwrap().unwrap().manager_id, None);
    assert!(store.get::<Department>(1).unwrap().unwrap().has_member(colleague));
    assert!(store.get::<Project>(1).unwrap().unwrap().has_member(colleague));
    assert!(store.pending_intents().unwrap().is_empty());
}

#[test]
fn delete_tolerates_missing_counterparts() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seed(&store);
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let employee_id = service
        .create_employee(&EmployeeDraft::new("Radia"), &everything())
        .unwrap();
    store.delete::<Department>(1).unwrap();
    store.delete::<Project>(2).unwrap();
    store.delete::<Task>(2).unwrap();

    let report = service.delete_employee(employee_id).unwrap();
    assert_eq!(report.projects.removed, vec![1]);
    assert_eq!(report.projects.missing, vec![2]);
    assert_eq!(report.tasks.missing, vec![2]);
    assert!(store.get::<Employee>(employee_id).unwrap().is_none());
    assert!(!store.get::<Project>(1).unwrap().unwrap().has_member(employee_id));
}

#[test]
fn delete_of_unknown_employee_opens_no_intent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let err = service.delete_employee(5).unwrap_err();
    assert!(matches!(
        err,
        AssociationError::NotFound {
            kind: EntityKind::Employee,
            id: 5
        }
    ));
    assert!(store.pending_intents().unwrap().is_empty());
}

#[test]
fn resume_finishes_cascade_interrupted_before_any_step() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seed(&store);
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let employee_id = service
        .create_employee(&EmployeeDraft::new("Frances"), &everything())
        .unwrap();
    let intent = store.open_intent(employee_id).unwrap();
    assert_eq!(store.open_intent(employee_id).unwrap(), intent);
    assert_eq!(service.pending_cascades().unwrap(), vec![intent.clone()]);

    assert_eq!(service.resume_pending_cascades().unwrap(), vec![employee_id]);
    assert!(store.get::<Employee>(employee_id).unwrap().is_none());
    assert_no_references(&store, employee_id);
    assert!(store.pending_intents().unwrap().is_empty());
    assert!(service.resume_pending_cascades().unwrap().is_empty());
}

#[test]
fn resume_sweeps_references_when_employee_document_is_gone() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seed(&store);
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let employee_id = service
        .create_employee(&EmployeeDraft::new("Katherine"), &everything())
        .unwrap();
    store.open_intent(employee_id).unwrap();
    store.delete::<Employee>(employee_id).unwrap();

    assert_eq!(service.resume_pending_cascades().unwrap(), vec![employee_id]);
    assert_no_references(&store, employee_id);
    assert!(store.pending_intents().unwrap().is_empty());
}

#[test]
fn resume_keeps_going_after_a_failing_intent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    seed(&store);
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let broken = service
        .create_employee(&EmployeeDraft::new("Broken"), &DesiredAssociations::default())
        .unwrap();
    let healthy = service
        .create_employee(&EmployeeDraft::new("Healthy"), &everything())
        .unwrap();
    assert_eq!(broken, 1);
    store.open_intent(broken).unwrap();
    store.open_intent(healthy).unwrap();
    conn.execute(
        "UPDATE documents SET body = '{\"id\": 1, \"name\": 5}'
         WHERE collection = 'employee' AND id = ?1;",
        [broken],
    )
    .unwrap();

    let err = service.resume_pending_cascades().unwrap_err();
    assert!(matches!(err, AssociationError::Store(_)));

    assert!(store.get::<Employee>(healthy).unwrap().is_none());
    assert_no_references(&store, healthy);
    let pending: Vec<EntityId> = store
        .pending_intents()
        .unwrap()
        .into_iter()
        .map(|intent| intent.employee_id)
        .collect();
    assert_eq!(pending, vec![broken]);
}

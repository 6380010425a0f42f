use hrm_core::repo::document_store::{modify, Modified};
use hrm_core::{
    open_db_in_memory, Department, DocumentStore, EntityKind, Project, SqliteDocumentStore,
    StoreError, Task,
};

#[test]
fn upsert_bumps_version_and_replace_checks_it() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    assert_eq!(store.upsert(&Department::new(1, "R&D")).unwrap(), 1);
    assert_eq!(store.upsert(&Department::new(1, "Research")).unwrap(), 2);

    let loaded = store.load::<Department>(1).unwrap().unwrap();
    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.document.name, "Research");

    let mut stale = loaded.document.clone();
    stale.name = "Stale".to_string();
    store.upsert(&Department::new(1, "Concurrent")).unwrap();

    let err = store.replace(&stale, loaded.version).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Conflict {
            kind: EntityKind::Department,
            id: 1,
            expected_version: 2
        }
    ));
    assert_eq!(store.get::<Department>(1).unwrap().unwrap().name, "Concurrent");
}

#[test]
fn modify_reports_missing_unchanged_and_written() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store.upsert(&Department::new(3, "Ops")).unwrap();

    let missing = modify(&store, 4, |department: &mut Department| department.enroll(1)).unwrap();
    assert!(missing.is_missing());

    let written = modify(&store, 3, |department: &mut Department| department.enroll(1)).unwrap();
    assert!(written.was_written());

    let unchanged = modify(&store, 3, |department: &mut Department| department.enroll(1)).unwrap();
    assert!(matches!(unchanged, Modified::Unchanged(_)));
    assert_eq!(store.load::<Department>(3).unwrap().unwrap().version, 2);
}

#[test]
fn find_by_field_walks_nested_arrays() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let mut alpha = Project::new(1, "Alpha");
    alpha.add_member(7);
    alpha.add_member(8);
    let mut beta = Project::new(2, "Beta");
    beta.add_member(8);
    store.upsert(&alpha).unwrap();
    store.upsert(&beta).unwrap();
    store.upsert(&Project::new(3, "Gamma")).unwrap();

    let ids = |employee_id| {
        store
            .find_by_field::<Project>("members.employeeId", employee_id)
            .unwrap()
            .into_iter()
            .map(|project| project.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(7), vec![1]);
    assert_eq!(ids(8), vec![1, 2]);
    assert!(ids(9).is_empty());
}

#[test]
fn find_by_field_matches_scalar_and_skips_null() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let mut owned = Task::new(1, "Owned");
    owned.manager_id = Some(5);
    store.upsert(&owned).unwrap();
    store.upsert(&Task::new(2, "Open")).unwrap();

    let found = store.find_by_field::<Task>("managerId", 5).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 1);
}

#[test]
fn malformed_field_path_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let err = store.find_by_field::<Task>("members..id", 1).unwrap_err();
    assert!(matches!(err, StoreError::InvalidFieldPath(_)));
}

#[test]
fn next_id_never_reuses_deleted_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let first = store.next_id(EntityKind::Department).unwrap();
    store.upsert(&Department::new(first, "A")).unwrap();
    let second = store.next_id(EntityKind::Department).unwrap();
    store.upsert(&Department::new(second, "B")).unwrap();
    assert_eq!((first, second), (1, 2));

    assert!(store.delete::<Department>(second).unwrap());
    assert!(!store.delete::<Department>(second).unwrap());
    assert_eq!(store.next_id(EntityKind::Department).unwrap(), 3);
}

#[test]
fn next_id_skips_past_explicitly_written_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    store.upsert(&Task::new(40, "Seeded")).unwrap();
    assert_eq!(store.next_id(EntityKind::Task).unwrap(), 41);
    assert_eq!(store.next_id(EntityKind::Project).unwrap(), 1);
}

#[test]
fn non_positive_ids_are_rejected_on_write() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let err = store.upsert(&Task::new(0, "Zero")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidId {
            kind: EntityKind::Task,
            id: 0
        }
    ));
    assert!(store.find_all::<Task>().unwrap().is_empty());
}

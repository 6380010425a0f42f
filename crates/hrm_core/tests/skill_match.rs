use hrm_core::{
    open_db_in_memory, parse_requirements, AssociationError, DesiredAssociations, DocumentStore,
    EmployeeDraft, EmployeeService, EntityId, EntityKind, Skill, SkillMatchService,
    SqliteDocumentStore,
};

fn hire(service: &EmployeeService<SqliteDocumentStore<'_>>, name: &str, skills: &str) -> EntityId {
    let desired = DesiredAssociations {
        skills_spec: skills.to_string(),
        ..DesiredAssociations::default()
    };
    service
        .create_employee(&EmployeeDraft::new(name), &desired)
        .unwrap()
}

#[test]
fn employees_must_meet_every_requirement() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store.upsert(&Skill::new(1, "Rust", "language")).unwrap();
    store.upsert(&Skill::new(2, "SQL", "language")).unwrap();
    let service = EmployeeService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let senior = hire(&service, "Senior", "1:5,2:4");
    let junior = hire(&service, "Junior", "1:2,2:4");
    let _dba = hire(&service, "Dba", "2:5");

    let matcher = SkillMatchService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let matched = |spec: &str| -> Vec<EntityId> {
        matcher
            .match_by_spec(spec)
            .unwrap()
            .into_iter()
            .map(|employee| employee.id)
            .collect()
    };

    assert_eq!(matched("1:4"), vec![senior]);
    assert_eq!(matched("1:2,2:4"), vec![senior, junior]);
    assert_eq!(matched("1:1,1:5"), vec![senior]);
    assert_eq!(matched("").len(), 3);
}

#[test]
fn unknown_skill_in_requirements_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let matcher = SkillMatchService::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let requirements = parse_requirements("9:1").unwrap();
    let err = matcher.match_by_skills(&requirements).unwrap_err();
    assert!(matches!(
        err,
        AssociationError::NotFound {
            kind: EntityKind::Skill,
            id: 9
        }
    ));
}

//! Core domain logic for the HR association engine.
//! This crate is the single source of truth for cross-document invariants.

pub mod association;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use association::error::{AssocResult, AssociationError};
pub use association::{Eviction, SyncReport};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSink, LoggingError};
pub use model::department::Department;
pub use model::employee::{Employee, SkillLevel};
pub use model::project::Project;
pub use model::skill::Skill;
pub use model::task::Task;
pub use model::training::Training;
pub use model::{Document, EntityId, EntityKind};
pub use repo::cascade_journal::{CascadeIntent, CascadeJournal};
pub use repo::document_store::{DocumentStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteDocumentStore;
pub use service::employee_service::{
    CascadeReport, DepartmentStatus, DesiredAssociations, EmployeeDetail, EmployeeDraft,
    EmployeeService,
};
pub use service::skill_match_service::{parse_requirements, SkillMatchService, SkillRequirement};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! CLI entry point.
//!
//! # Responsibility
//! - Print the core version.
//! - Given a config path, open the store, finish interrupted delete
//!   cascades and print per-collection document counts.

use hrm_core::{
    core_version, init_logging, open_db, open_db_in_memory, CoreConfig, Department,
    DocumentStore, Employee, EmployeeService, Project, Skill, SqliteDocumentStore, Task,
    Training,
};
use log::info;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("hrm_core version={}", core_version());
    let Some(config_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match run(Path::new(&config_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &Path) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::load(config_path)?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let conn = if config.is_in_memory() {
        open_db_in_memory()?
    } else {
        open_db(&config.database_path)?
    };
    let store = SqliteDocumentStore::try_new(&conn)?.with_write_attempts(config.write_attempts);
    let service = EmployeeService::new(store);

    let resumed = service.resume_pending_cascades()?;
    info!(
        "event=cli_start module=cli status=ok resumed_cascades={}",
        resumed.len()
    );
    println!("resumed_cascades={}", resumed.len());

    let store = service.store();
    println!("employee={}", store.find_all::<Employee>()?.len());
    println!("department={}", store.find_all::<Department>()?.len());
    println!("project={}", store.find_all::<Project>()?.len());
    println!("task={}", store.find_all::<Task>()?.len());
    println!("training={}", store.find_all::<Training>()?.len());
    println!("skill={}", store.find_all::<Skill>()?.len());
    Ok(())
}

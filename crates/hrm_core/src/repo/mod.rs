//! Document store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the uniform per-collection store contract used by the engine.
//! - Isolate SQLite and JSON encoding details from association logic.
//!
//! # Invariants
//! - Store APIs return semantic errors (`Conflict`, `InvalidId`) in addition
//!   to DB transport errors.
//! - Counterpart mutations go through [`document_store::modify`] so every
//!   write is a compare-and-set against the version that was read.

pub mod cascade_journal;
pub mod document_store;
pub mod field_path;
pub mod sqlite_store;

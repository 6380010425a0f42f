//! Uniform document store contract.
//!
//! # Responsibility
//! - Describe get/find/upsert/delete over any [`Document`] collection.
//! - Provide the versioned load-mutate-persist loop shared by all managers.
//!
//! # Invariants
//! - `version` increases by one on every successful write of a document.
//! - `replace` succeeds only when the stored version equals the expected one.

use crate::db::DbError;
use crate::model::{Document, EntityId, EntityKind};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Default number of compare-and-set attempts before a conflict surfaces.
pub const DEFAULT_WRITE_ATTEMPTS: u32 = 3;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Document body could not be encoded or decoded.
    Serialization {
        kind: EntityKind,
        source: serde_json::Error,
    },
    /// Stored version moved past the one the writer read.
    Conflict {
        kind: EntityKind,
        id: EntityId,
        expected_version: u64,
    },
    /// Identifiers must be positive.
    InvalidId { kind: EntityKind, id: EntityId },
    /// Dotted field path is malformed.
    InvalidFieldPath(String),
    /// Journal entry referenced by id does not exist.
    UnknownIntent(Uuid),
    /// Required table is missing from the connection schema.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid document.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization { kind, source } => {
                write!(f, "failed to encode/decode {kind} document: {source}")
            }
            Self::Conflict {
                kind,
                id,
                expected_version,
            } => write!(
                f,
                "write conflict on {kind} {id}: expected version {expected_version}"
            ),
            Self::InvalidId { kind, id } => write!(f, "invalid {kind} id: {id}"),
            Self::InvalidFieldPath(path) => write!(f, "invalid field path: `{path}`"),
            Self::UnknownIntent(intent_id) => write!(f, "cascade intent not found: {intent_id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "document store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A document together with the store version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<D> {
    pub document: D,
    pub version: u64,
}

/// Per-collection document store.
///
/// The collection is selected by the document type (`D::KIND`).
pub trait DocumentStore {
    /// Loads one document with its current version.
    fn load<D: Document>(&self, id: EntityId) -> StoreResult<Option<Versioned<D>>>;

    /// Loads one document, discarding version metadata.
    fn get<D: Document>(&self, id: EntityId) -> StoreResult<Option<D>> {
        Ok(self.load::<D>(id)?.map(|versioned| versioned.document))
    }

    /// Lists every document in the collection ordered by id.
    fn find_all<D: Document>(&self) -> StoreResult<Vec<D>>;

    /// Lists documents whose dotted `field` path holds `value`.
    ///
    /// Arrays met along the path match when any element matches, so
    /// `members.employeeId` and `members` both address roster entries.
    fn find_by_field<D: Document>(&self, field: &str, value: EntityId) -> StoreResult<Vec<D>>;

    /// Inserts or overwrites a document unconditionally. Returns new version.
    fn upsert<D: Document>(&self, document: &D) -> StoreResult<u64>;

    /// Overwrites a document only if its version still equals `expected_version`.
    fn replace<D: Document>(&self, document: &D, expected_version: u64) -> StoreResult<u64>;

    /// Deletes one document. Returns whether a row was removed.
    fn delete<D: Document>(&self, id: EntityId) -> StoreResult<bool>;

    /// Issues the next never-used id for `kind`.
    fn next_id(&self, kind: EntityKind) -> StoreResult<EntityId>;

    /// Compare-and-set attempts used by [`modify`].
    fn write_attempts(&self) -> u32 {
        DEFAULT_WRITE_ATTEMPTS
    }
}

/// Outcome of one [`modify`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modified<D> {
    /// No document with that id exists.
    Missing,
    /// The mutation reported no change; nothing was written.
    Unchanged(D),
    /// The mutated document was persisted.
    Written(D),
}

impl<D> Modified<D> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn was_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }

    pub fn into_document(self) -> Option<D> {
        match self {
            Self::Missing => None,
            Self::Unchanged(document) | Self::Written(document) => Some(document),
        }
    }
}

/// Runs a versioned load-mutate-persist cycle on one document.
///
/// `mutate` returns whether it changed the document. On a version conflict
/// the document is reloaded and `mutate` re-applied, up to
/// `store.write_attempts()` times.
pub fn modify<S, D, F>(store: &S, id: EntityId, mut mutate: F) -> StoreResult<Modified<D>>
where
    S: DocumentStore,
    D: Document,
    F: FnMut(&mut D) -> bool,
{
    let attempts = store.write_attempts().max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let Some(Versioned {
            mut document,
            version,
        }) = store.load::<D>(id)?
        else {
            return Ok(Modified::Missing);
        };

        if !mutate(&mut document) {
            return Ok(Modified::Unchanged(document));
        }

        match store.replace(&document, version) {
            Ok(_) => return Ok(Modified::Written(document)),
            Err(StoreError::Conflict { .. }) if attempt < attempts => {
                warn!(
                    "event=store_write module=repo status=retry kind={} id={} attempt={} expected_version={}",
                    D::KIND,
                    id,
                    attempt,
                    version
                );
            }
            Err(err) => return Err(err),
        }
    }
}

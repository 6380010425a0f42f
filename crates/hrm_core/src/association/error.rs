//! Error taxonomy of the association engine.

use crate::model::{EntityId, EntityKind};
use crate::repo::document_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AssocResult<T> = Result<T, AssociationError>;

#[derive(Debug)]
pub enum AssociationError {
    /// A referenced document does not exist.
    NotFound { kind: EntityKind, id: EntityId },
    /// Caller input is malformed or out of range.
    Validation { field: &'static str, reason: String },
    /// Persistence-layer failure.
    Store(StoreError),
}

impl AssociationError {
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Short machine-readable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
            Self::Store(_) => "store",
        }
    }
}

impl Display for AssociationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssociationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AssociationError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

//! Error types for Writeset operations.

use std::fmt;

/// Convenience alias for writeset results.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for all write-path operations.
///
/// The write path performs no retries and no compensating rollback: every
/// error propagates to the caller, whose enclosing transaction supplies
/// all-or-nothing semantics.
#[derive(Debug)]
pub enum Error {
    /// Metadata for an entity type could not be found. Fatal.
    Metadata(MetadataError),
    /// A store write failed (constraint violation, connectivity loss, ...).
    Store(StoreError),
    /// An identifier the update path needed could not be resolved.
    Identifier(IdentifierError),
}

/// Unknown entity type.
#[derive(Debug)]
pub struct MetadataError {
    /// The entity-type name that had no registered metadata.
    pub entity_type: String,
}

/// A failed store write.
#[derive(Debug)]
pub struct StoreError {
    /// What went wrong.
    pub kind: StoreErrorKind,
    /// The table the write targeted.
    pub table: String,
    /// Driver-supplied detail.
    pub message: String,
}

/// Classification of store write failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Constraint violation (unique, foreign key, not-null, ...).
    Constraint,
    /// Connectivity loss while talking to the store.
    Connection,
    /// Any other store-side failure.
    Database,
}

/// A target entity's identifier was needed but not available.
#[derive(Debug)]
pub struct IdentifierError {
    /// The entity-type name of the target.
    pub entity_type: String,
    /// The identifier field that could not be resolved.
    pub field: String,
}

impl StoreError {
    /// Create a store error.
    pub fn new(kind: StoreErrorKind, table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Metadata(e) => write!(f, "no metadata for entity type '{}'", e.entity_type),
            Error::Store(e) => {
                let kind = match e.kind {
                    StoreErrorKind::Constraint => "constraint violation",
                    StoreErrorKind::Connection => "connection failure",
                    StoreErrorKind::Database => "store failure",
                };
                write!(f, "{} writing table '{}': {}", kind, e.table, e.message)
            }
            Error::Identifier(e) => write!(
                f,
                "identifier field '{}' of entity type '{}' is not resolved",
                e.field, e.entity_type
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<MetadataError> for Error {
    fn from(e: MetadataError) -> Self {
        Error::Metadata(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<IdentifierError> for Error {
    fn from(e: IdentifierError) -> Self {
        Error::Identifier(e)
    }
}

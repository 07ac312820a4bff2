//! Unit-of-work collaborator surface.
//!
//! The unit of work that wraps this core — tracking persistence state,
//! diffing entities, and running deferred fix-ups after the write pass —
//! lives outside it. This module defines the trait the write path talks to
//! and the record types that travel across that seam.

use writeset_core::{ColumnMap, EntityHandle, EntityToken, Result, Value};

/// Persistence state of an entity as known to the unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceState {
    /// Never written to the store.
    #[default]
    New,
    /// Fully persisted and tracked.
    Managed,
    /// Marked for deletion.
    Removed,
}

/// A one-shot association fix-up to run after the current write pass.
///
/// Deferred updates exist to break insertion-order dependencies: the write
/// pass stores a null foreign key now and hands the real link here, to be
/// applied once both identifiers exist. This core only ever *creates* these
/// records; executing them is the scheduler's job.
#[derive(Debug, Clone)]
pub struct DeferredUpdate {
    /// The entity whose association column(s) need fixing up.
    pub entity: EntityHandle,
    /// The association field to fix up.
    pub field: &'static str,
    /// The value the field held when the write pass ran (always the unlinked
    /// state in practice).
    pub old_value: Option<EntityHandle>,
    /// The target the field must point at once identifiers are known.
    pub new_value: Option<EntityHandle>,
}

/// One endpoint of a detected field mutation.
#[derive(Debug, Clone)]
pub enum ChangeValue {
    /// A scalar value (including null).
    Scalar(Value),
    /// A to-one association target.
    Entity(Option<EntityHandle>),
}

impl ChangeValue {
    /// Shorthand for a scalar endpoint.
    pub fn scalar(value: impl Into<Value>) -> Self {
        ChangeValue::Scalar(value.into())
    }

    /// Shorthand for an association endpoint.
    pub fn entity(target: Option<EntityHandle>) -> Self {
        ChangeValue::Entity(target)
    }

    /// Whether this endpoint is null / unset.
    pub fn is_null(&self) -> bool {
        match self {
            ChangeValue::Scalar(v) => v.is_null(),
            ChangeValue::Entity(t) => t.is_none(),
        }
    }
}

/// A detected mutation of one field.
#[derive(Debug, Clone)]
pub struct FieldChange {
    /// The value before the mutation.
    pub old: ChangeValue,
    /// The value after the mutation.
    pub new: ChangeValue,
}

/// The detected mutations of one entity, field by field.
///
/// Change records are produced by whatever diffing the unit of work performs;
/// this core only consumes them on the update path.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecord {
    entries: Vec<(&'static str, FieldChange)>,
}

impl ChangeRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field mutation, replacing any earlier entry for the field.
    pub fn record(&mut self, field: &'static str, old: ChangeValue, new: ChangeValue) {
        let change = FieldChange { old, new };
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == field) {
            entry.1 = change;
        } else {
            self.entries.push((field, change));
        }
    }

    /// Get the change recorded for a field.
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, change)| change)
    }

    /// Iterate changes in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldChange)> {
        self.entries.iter().map(|(name, change)| (*name, change))
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fields changed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The unit-of-work collaborator the write path consults.
///
/// Implementations own the persistence-state oracle, identifier resolution,
/// change-set diffing, and the deferred-update queue. The write path calls
/// in; it never drives the unit of work's own lifecycle.
pub trait UnitOfWork {
    /// Whether the entity is scheduled for insertion by the unit of work
    /// itself (distinct from membership in this core's pending registry).
    fn is_scheduled_for_insert(&self, token: EntityToken) -> bool;

    /// The persistence state of an entity.
    fn persistence_state(&self, token: EntityToken) -> PersistenceState;

    /// Queue a fix-up write to run after the current pass.
    fn schedule_deferred_update(&mut self, update: DeferredUpdate);

    /// Resolve an entity's finalized identifier as a field-to-value map.
    ///
    /// # Errors
    ///
    /// Fails when the identifier is not yet known; the update path surfaces
    /// that uncaught.
    fn resolve_identifier(&self, entity: &EntityHandle) -> Result<ColumnMap>;

    /// The detected change set of an entity.
    fn change_set_of(&self, token: EntityToken) -> ChangeRecord;
}

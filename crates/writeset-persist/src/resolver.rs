//! To-one association resolution.
//!
//! Given an owning-side to-one association, the resolver decides whether its
//! foreign-key columns can be computed now, and when they cannot, schedules
//! the deferred fix-up that makes a single optimistic write pass sufficient.
//! The two self-reference cases are the only place the write path reasons
//! about ordering at all; everything else reads raw values and moves on.

use crate::registry::PendingInserts;
use crate::unit_of_work::{DeferredUpdate, PersistenceState, UnitOfWork};
use writeset_core::{
    AssociationMeta, EntityHandle, EntityMeta, MetadataProvider, Result, Value,
};

/// Resolves owning-side to-one associations into column values.
///
/// One resolver is built per change-set computation; it borrows the pending
/// registry for membership tests and the unit of work for state queries and
/// deferred-update scheduling.
pub struct AssociationResolver<'a> {
    meta: &'a EntityMeta,
    metadata: &'a dyn MetadataProvider,
    pending: &'a PendingInserts,
    uow: &'a mut dyn UnitOfWork,
}

impl<'a> AssociationResolver<'a> {
    /// Create a resolver for one entity type's associations.
    pub fn new(
        meta: &'a EntityMeta,
        metadata: &'a dyn MetadataProvider,
        pending: &'a PendingInserts,
        uow: &'a mut dyn UnitOfWork,
    ) -> Self {
        Self {
            meta,
            metadata,
            pending,
            uow,
        }
    }

    /// Compute the column values for one owning-side to-one association.
    ///
    /// Returns exactly one `(source column, value)` pair per mapped column
    /// pair. Resolution rules:
    ///
    /// 1. No target: every mapped column is null, nothing is deferred.
    /// 2. Self-referencing association on an identity-keyed type:
    ///    a. the target is itself awaiting insertion — columns are null now
    ///       and a deferred update on the *current* entity re-links the field
    ///       once the target has a row;
    ///    b. the current entity is being inserted and the target is already
    ///       managed — columns are written from the target, and a deferred
    ///       update on the *target* fixes its back-pointer, since the current
    ///       entity's own identifier is still unknown.
    /// 3. Otherwise the target's raw property values are read through its
    ///    accessor table, column by column. A pending but non-self-referencing
    ///    target also lands here and contributes whatever its identifier
    ///    fields currently hold.
    pub fn resolve_to_one(
        &mut self,
        entity: &EntityHandle,
        assoc: &AssociationMeta,
        is_insert: bool,
    ) -> Result<Vec<(&'static str, Value)>> {
        let mut target = (assoc.getter)(&*entity.borrow());

        if let Some(linked) = target.clone() {
            if assoc.self_referencing && self.meta.identity_generated_key {
                let token = linked.token();
                if self.pending.contains(token) || self.uow.is_scheduled_for_insert(token) {
                    // The target has no row yet. Store null and re-link after
                    // the target's insert assigns its identifier.
                    tracing::debug!(
                        field = assoc.field_name,
                        entity_type = entity.entity_type(),
                        "deferring self-referencing association until target is inserted"
                    );
                    self.uow.schedule_deferred_update(DeferredUpdate {
                        entity: entity.clone(),
                        field: assoc.field_name,
                        old_value: None,
                        new_value: Some(linked),
                    });
                    target = None;
                } else if is_insert
                    && self.uow.persistence_state(token) == PersistenceState::Managed
                {
                    // The target's identifier is known but ours is not yet:
                    // write its columns now and fix up the back-pointer on the
                    // target once our insert has assigned an identifier.
                    tracing::debug!(
                        field = assoc.field_name,
                        entity_type = entity.entity_type(),
                        "scheduling back-pointer fix-up on managed target"
                    );
                    self.uow.schedule_deferred_update(DeferredUpdate {
                        entity: linked,
                        field: assoc.field_name,
                        old_value: None,
                        new_value: Some(entity.clone()),
                    });
                }
            }
        }

        let mut columns = Vec::with_capacity(assoc.source_to_target_columns.len());
        match target {
            None => {
                for (source, _) in assoc.source_to_target_columns {
                    columns.push((*source, Value::Null));
                }
            }
            Some(linked) => {
                let target_meta = self.metadata.describe(assoc.target_entity)?;
                for (source, target_column) in assoc.source_to_target_columns {
                    columns.push((*source, raw_column_value(&target_meta, &linked, target_column)));
                }
            }
        }
        Ok(columns)
    }
}

/// Read the raw property value backing a column, via the accessor table.
///
/// This deliberately reads the live field rather than a materialized
/// identifier, so a target whose own identifier was itself just filled in by
/// a deferred fix-up is observed correctly.
fn raw_column_value(target_meta: &EntityMeta, target: &EntityHandle, column: &str) -> Value {
    match target_meta
        .fields
        .iter()
        .find(|f| f.column_name == column)
    {
        Some(field) => (field.getter)(&*target.borrow()),
        None => {
            tracing::trace!(
                entity_type = target_meta.entity_type,
                column,
                "no field backs the referenced column"
            );
            Value::Null
        }
    }
}

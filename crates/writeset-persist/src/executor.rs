//! Write execution.
//!
//! The executor drives insert, update, and delete calls against the store
//! using the change-set builder's output, and drains the pending registry on
//! flush. It runs exactly one optimistic pass: no retries, no re-ordering, no
//! second chance — cross-reference ordering is the deferred-update
//! mechanism's job, not this loop's.

use crate::change_set::ChangeSetBuilder;
use crate::registry::PendingInserts;
use crate::unit_of_work::{PersistenceState, UnitOfWork};
use std::rc::Rc;
use writeset_core::{
    ColumnMap, EntityHandle, MetadataProvider, Result, Store, TypeConverter,
};

/// Summary of a completed flush pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlushOutcome {
    /// Number of rows inserted.
    pub inserted: usize,
}

impl FlushOutcome {
    /// Create an empty outcome.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Executes entity writes against a store.
///
/// One persister exists per unit of work. It owns the store handle, the
/// unit-of-work collaborator, and the pending registry; metadata and type
/// conversion are shared seams. The persister is intentionally
/// single-threaded — callers serialize flushes, and the enclosing transaction
/// (owned by the caller) supplies atomicity for the whole pass.
pub struct EntityPersister<S: Store, U: UnitOfWork> {
    store: S,
    uow: U,
    metadata: Rc<dyn MetadataProvider>,
    converter: Box<dyn TypeConverter>,
    pending: PendingInserts,
}

impl<S: Store, U: UnitOfWork> EntityPersister<S, U> {
    /// Create a persister over a store and unit of work.
    pub fn new(
        store: S,
        uow: U,
        metadata: Rc<dyn MetadataProvider>,
        converter: Box<dyn TypeConverter>,
    ) -> Self {
        Self {
            store,
            uow,
            metadata,
            converter,
            pending: PendingInserts::new(),
        }
    }

    /// Queue an entity for insertion on the next flush.
    pub fn queue_insert(&mut self, entity: EntityHandle) {
        self.pending.add(entity);
    }

    /// The pending registry.
    pub fn pending(&self) -> &PendingInserts {
        &self.pending
    }

    /// The store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The unit-of-work collaborator.
    pub fn uow(&self) -> &U {
        &self.uow
    }

    /// Insert one entity's row.
    ///
    /// Silently returns `None` when nothing is queued for insertion; the
    /// insert pass only makes sense while the registry is non-empty.
    /// Otherwise builds the full snapshot and issues a single-table insert,
    /// returning the affected-row count.
    #[tracing::instrument(level = "debug", skip(self, entity), fields(entity_type = entity.entity_type()))]
    pub fn insert_execute(&mut self, entity: &EntityHandle) -> Result<Option<u64>> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let meta = self.metadata.describe(entity.entity_type())?;
        let data = {
            let mut builder = ChangeSetBuilder::new(
                &meta,
                self.metadata.as_ref(),
                self.converter.as_ref(),
                &self.pending,
                &mut self.uow,
            );
            builder.insert_data(entity)?
        };

        tracing::debug!(table = meta.owning_table, columns = data.len(), "executing insert");
        let affected = self.store.insert(meta.owning_table, &data)?;
        Ok(Some(affected))
    }

    /// Update one entity's row(s), keyed by the caller-supplied predicate.
    ///
    /// Returns `None` — the no-op sentinel, not an error — when the owning
    /// table's slice of the update data is empty; no store call is issued in
    /// that case. Otherwise every non-empty table slice is written with the
    /// same predicate and the summed affected-row count is returned.
    #[tracing::instrument(level = "debug", skip(self, entity, predicate), fields(entity_type = entity.entity_type()))]
    pub fn update_execute(
        &mut self,
        entity: &EntityHandle,
        predicate: &ColumnMap,
    ) -> Result<Option<u64>> {
        let meta = self.metadata.describe(entity.entity_type())?;
        let update = {
            let mut builder = ChangeSetBuilder::new(
                &meta,
                self.metadata.as_ref(),
                self.converter.as_ref(),
                &self.pending,
                &mut self.uow,
            );
            builder.update_data(entity)?
        };

        let owning_is_empty = update.table(meta.owning_table).is_none_or(ColumnMap::is_empty);
        if owning_is_empty {
            tracing::debug!(table = meta.owning_table, "no owning-table columns to update");
            return Ok(None);
        }

        let mut affected = 0;
        for (table, slice) in update.iter() {
            if slice.is_empty() {
                continue;
            }
            tracing::debug!(table, columns = slice.len(), "executing update");
            affected += self.store.update(table, slice, predicate)?;
        }
        Ok(Some(affected))
    }

    /// Delete one entity's row, keyed by the caller-supplied predicate.
    ///
    /// Guarded on the unit of work's removal state: entities not marked
    /// removed produce no store call and `None`.
    #[tracing::instrument(level = "debug", skip(self, entity, predicate), fields(entity_type = entity.entity_type()))]
    pub fn delete_execute(
        &mut self,
        entity: &EntityHandle,
        predicate: &ColumnMap,
    ) -> Result<Option<u64>> {
        if self.uow.persistence_state(entity.token()) != PersistenceState::Removed {
            return Ok(None);
        }

        let meta = self.metadata.describe(entity.entity_type())?;
        tracing::debug!(table = meta.owning_table, "executing delete");
        let affected = self.store.delete(meta.owning_table, predicate)?;
        Ok(Some(affected))
    }

    /// Insert every queued entity, in queue order, once.
    ///
    /// Each entity is removed from the registry immediately after its insert
    /// call is issued, before the outcome is inspected: a failing write
    /// leaves that entity already removed and aborts the remainder of the
    /// pass, with not-yet-visited entities still pending for a future flush.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn flush(&mut self) -> Result<FlushOutcome> {
        let queued = self.pending.list();
        tracing::info!(queued = queued.len(), "flushing pending inserts");

        let mut outcome = FlushOutcome::new();
        for entity in queued {
            let result = self.insert_execute(&entity);
            self.pending.remove(entity.token());
            match result {
                Ok(Some(_)) => outcome.inserted += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        inserted = outcome.inserted,
                        remaining = self.pending.len(),
                        "flush aborted by store failure"
                    );
                    return Err(e);
                }
            }
        }

        tracing::info!(inserted = outcome.inserted, "flush complete");
        Ok(outcome)
    }
}

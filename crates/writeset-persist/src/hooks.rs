//! Lifecycle hook surface.
//!
//! The write path is driven by lifecycle signals raised elsewhere — an entity
//! needs persisting, a flush is due, an update or removal was requested.
//! Dispatch of those signals is external; this module gives them a concrete
//! shape and routes each one onto the persister operation it names.

use crate::executor::{EntityPersister, FlushOutcome};
use crate::unit_of_work::UnitOfWork;
use writeset_core::{ColumnMap, EntityHandle, Result, Store};

/// A lifecycle signal consumed by the write path.
#[derive(Debug)]
pub enum LifecycleEvent {
    /// An entity needs persisting; queue it for the next flush.
    NeedsPersist(EntityHandle),
    /// Flush every queued insert now.
    PreFlush,
    /// An entity changed; write its update keyed by the predicate.
    Update {
        /// The changed entity.
        entity: EntityHandle,
        /// Identifier predicate keying the write.
        predicate: ColumnMap,
    },
    /// An entity was removed; delete its row keyed by the predicate.
    Remove {
        /// The removed entity.
        entity: EntityHandle,
        /// Identifier predicate keying the write.
        predicate: ColumnMap,
    },
}

/// What handling a lifecycle event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The entity was queued for insertion.
    Queued,
    /// A flush pass ran and inserted this many rows.
    Flushed(usize),
    /// An update was issued (`None` is the no-op sentinel).
    Updated(Option<u64>),
    /// A delete was issued (`None` means the guard blocked it).
    Deleted(Option<u64>),
}

impl<S: Store, U: UnitOfWork> EntityPersister<S, U> {
    /// Handle one lifecycle signal.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> Result<EventOutcome> {
        match event {
            LifecycleEvent::NeedsPersist(entity) => {
                self.queue_insert(entity);
                Ok(EventOutcome::Queued)
            }
            LifecycleEvent::PreFlush => {
                let FlushOutcome { inserted } = self.flush()?;
                Ok(EventOutcome::Flushed(inserted))
            }
            LifecycleEvent::Update { entity, predicate } => {
                let affected = self.update_execute(&entity, &predicate)?;
                Ok(EventOutcome::Updated(affected))
            }
            LifecycleEvent::Remove { entity, predicate } => {
                let affected = self.delete_execute(&entity, &predicate)?;
                Ok(EventOutcome::Deleted(affected))
            }
        }
    }
}

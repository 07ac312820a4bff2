//! Change-set building and write execution for Writeset.
//!
//! `writeset-persist` is the **write-path core**. Given caller-owned domain
//! objects and their mapping metadata, it computes the exact column-level
//! data to write, routes insert/update/delete per owning table, and resolves
//! references to not-yet-persisted entities with deferred fix-up writes
//! instead of a dependency-ordered schedule.
//!
//! # Role In The Architecture
//!
//! - **Pending registry**: deduplicated queue of entities awaiting insertion.
//! - **Change-set builder**: full snapshots for inserts, diff-driven and
//!   table-grouped data for updates.
//! - **Association resolver**: decides per foreign key whether to compute
//!   now, compute partially, or defer.
//! - **Write executor**: drives the store and drains the registry in one
//!   optimistic pass.
//!
//! # Design Philosophy
//!
//! - **One pass, plus fix-ups**: unresolvable foreign keys become null
//!   columns now and a [`DeferredUpdate`] later — never a topological sort.
//! - **Collaborators stay outside**: metadata description, the store driver,
//!   type conversion, diffing, and transactions are seams, not residents.
//! - **Synchronous on purpose**: every store call blocks; atomicity across a
//!   flush pass belongs to the caller's transaction.
//!
//! # Example
//!
//! ```ignore
//! let mut persister = EntityPersister::new(store, uow, metadata, converter);
//!
//! // Lifecycle signals drive the write path.
//! persister.handle_event(LifecycleEvent::NeedsPersist(category))?;
//! persister.handle_event(LifecycleEvent::PreFlush)?;
//!
//! // Updates are keyed by a caller-supplied identifier predicate.
//! persister.update_execute(&entity, &predicate)?;
//! ```

pub mod change_set;
pub mod executor;
pub mod hooks;
pub mod registry;
pub mod resolver;
pub mod unit_of_work;

pub use change_set::{ChangeSetBuilder, UpdateSet};
pub use executor::{EntityPersister, FlushOutcome};
pub use hooks::{EventOutcome, LifecycleEvent};
pub use registry::PendingInserts;
pub use resolver::AssociationResolver;
pub use unit_of_work::{
    ChangeRecord, ChangeValue, DeferredUpdate, FieldChange, PersistenceState, UnitOfWork,
};

#[cfg(test)]
pub(crate) mod testkit;

//! Writeset - the change-tracking and write-ordering core of an
//! object-to-relational persistence layer.
//!
//! Given a graph of in-memory domain objects and their declared field and
//! association mappings, Writeset computes the exact column-level data to
//! write, routes insert/update/delete per owning table, and resolves
//! references to not-yet-persisted entities — including self-referential
//! graphs — with deferred fix-up writes instead of a dependency-ordered
//! schedule.
//!
//! # Quick Start
//!
//! ```ignore
//! use writeset::prelude::*;
//!
//! // Metadata describes how each entity type maps onto its table.
//! let mut registry = MetadataRegistry::new();
//! registry.register(
//!     EntityMeta::new("Category", "categories")
//!         .identity_generated(true)
//!         .with_field(FieldMeta::new("id", "id", SemanticType::BigInt, category_id))
//!         .with_association(
//!             AssociationMeta::new("parent", "Category", category_parent)
//!                 .self_referencing(true)
//!                 .columns(&[("parent_id", "id")]),
//!         ),
//! );
//!
//! // One persister per unit of work.
//! let mut persister = EntityPersister::new(
//!     store,
//!     uow,
//!     Rc::new(registry),
//!     Box::new(StandardConverter::new()),
//! );
//!
//! // Lifecycle signals drive it.
//! persister.handle_event(LifecycleEvent::NeedsPersist(child))?;
//! persister.handle_event(LifecycleEvent::NeedsPersist(parent))?;
//! persister.handle_event(LifecycleEvent::PreFlush)?;
//! // The child's parent column was written null and one DeferredUpdate was
//! // handed to the unit of work to re-link it after the pass.
//! ```
//!
//! # Features
//!
//! - **Single optimistic pass**: flush never sorts the object graph; the two
//!   self-reference cases are handled locally with deferred updates
//! - **Identity tokens**: deduplication keys on object identity, never on
//!   business keys that may be unset before insertion
//! - **Typed accessor tables**: field reads go through function pointers
//!   resolved once per entity type
//! - **External collaborators**: the store driver, metadata description,
//!   type conversion, diffing, and transactions all stay behind traits

// Re-export all public types from sub-crates
pub use writeset_core::{
    AssocGetter,
    AssociationMeta,
    Cardinality,
    ColumnMap,
    EntityHandle,
    EntityMeta,
    EntityToken,
    Error,
    FieldGetter,
    FieldMeta,
    IdentifierError,
    MetadataError,
    MetadataProvider,
    MetadataRegistry,
    Result,
    SemanticType,
    StandardConverter,
    Store,
    StoreError,
    StoreErrorKind,
    TypeConverter,
    Value,
};

pub use writeset_persist::{
    AssociationResolver, ChangeRecord, ChangeSetBuilder, ChangeValue, DeferredUpdate,
    EntityPersister, EventOutcome, FieldChange, FlushOutcome, LifecycleEvent, PendingInserts,
    PersistenceState, UnitOfWork, UpdateSet,
};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::{
        AssociationMeta, Cardinality, ChangeRecord, ChangeValue, ColumnMap, DeferredUpdate,
        EntityHandle, EntityMeta, EntityPersister, EntityToken, Error, EventOutcome, FieldMeta,
        FlushOutcome, LifecycleEvent, MetadataProvider, MetadataRegistry, PendingInserts,
        PersistenceState, Result, SemanticType, StandardConverter, Store, TypeConverter,
        UnitOfWork, Value,
    };
}

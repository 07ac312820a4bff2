//! Shared fixtures for the write-path tests.
//!
//! The mock entity types exercise every mapping shape the core handles:
//!
//! - `Category`: self-referencing to-one parent under an identity key, plus a
//!   field routed to a side table (joined mapping).
//! - `Article`: scalar mix with a version field and an ordinary owning
//!   to-one association.
//! - `Author`: target of `Article.author`, with non-owning inverse sides.
//! - `Order` / `Shipment`: a composite two-column association key.
//!
//! `RecordingStore` captures store calls (optionally failing a scripted call
//! or assigning identity keys on insert); `ScriptedUow` plays the external
//! unit of work with preloaded states, identifiers, and change sets.

use crate::unit_of_work::{
    ChangeRecord, DeferredUpdate, PersistenceState, UnitOfWork,
};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use writeset_core::{
    AssociationMeta, Cardinality, ColumnMap, EntityHandle, EntityMeta, EntityToken, Error,
    FieldMeta, IdentifierError, MetadataRegistry, Result, SemanticType, Store, StoreError,
    StoreErrorKind, Value,
};

// ----------------------------------------------------------------------
// Mock entity types
// ----------------------------------------------------------------------

pub(crate) struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub parent: Option<EntityHandle>,
}

pub(crate) struct Article {
    pub id: Option<i64>,
    pub title: String,
    pub published: bool,
    pub revision: i64,
    pub author: Option<EntityHandle>,
}

pub(crate) struct Author {
    pub id: Option<i64>,
    pub name: String,
}

pub(crate) struct Order {
    pub order_no: i64,
    pub region: String,
}

pub(crate) struct Shipment {
    pub id: Option<i64>,
    pub order: Option<EntityHandle>,
}

pub(crate) fn category(id: Option<i64>, name: &str) -> EntityHandle {
    EntityHandle::new(
        "Category",
        Category {
            id,
            name: name.to_string(),
            slug: name.to_string(),
            parent: None,
        },
    )
}

pub(crate) fn article(id: Option<i64>, title: &str, author: &EntityHandle) -> EntityHandle {
    EntityHandle::new(
        "Article",
        Article {
            id,
            title: title.to_string(),
            published: false,
            revision: 1,
            author: Some(author.clone()),
        },
    )
}

pub(crate) fn author(id: Option<i64>, name: &str) -> EntityHandle {
    EntityHandle::new(
        "Author",
        Author {
            id,
            name: name.to_string(),
        },
    )
}

pub(crate) fn order(order_no: i64, region: &str) -> EntityHandle {
    EntityHandle::new(
        "Order",
        Order {
            order_no,
            region: region.to_string(),
        },
    )
}

pub(crate) fn shipment(id: Option<i64>, order: &EntityHandle) -> EntityHandle {
    EntityHandle::new(
        "Shipment",
        Shipment {
            id,
            order: Some(order.clone()),
        },
    )
}

pub(crate) fn link_parent(child: &EntityHandle, parent: &EntityHandle) {
    child.with_mut(|c: &mut Category| c.parent = Some(parent.clone()));
}

pub(crate) fn set_category_id(handle: &EntityHandle, id: i64) {
    handle.with_mut(|c: &mut Category| c.id = Some(id));
}

// ----------------------------------------------------------------------
// Accessor tables
// ----------------------------------------------------------------------

fn category_id(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Category>()
        .map_or(Value::Null, |c| Value::from(c.id))
}

fn category_name(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Category>()
        .map_or(Value::Null, |c| Value::from(c.name.clone()))
}

fn category_slug(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Category>()
        .map_or(Value::Null, |c| Value::from(c.slug.clone()))
}

fn category_parent(obj: &dyn Any) -> Option<EntityHandle> {
    obj.downcast_ref::<Category>().and_then(|c| c.parent.clone())
}

fn article_id(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Article>()
        .map_or(Value::Null, |a| Value::from(a.id))
}

fn article_title(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Article>()
        .map_or(Value::Null, |a| Value::from(a.title.clone()))
}

fn article_published(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Article>()
        .map_or(Value::Null, |a| Value::from(a.published))
}

fn article_revision(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Article>()
        .map_or(Value::Null, |a| Value::from(a.revision))
}

fn article_author(obj: &dyn Any) -> Option<EntityHandle> {
    obj.downcast_ref::<Article>().and_then(|a| a.author.clone())
}

fn author_id(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Author>()
        .map_or(Value::Null, |a| Value::from(a.id))
}

fn author_name(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Author>()
        .map_or(Value::Null, |a| Value::from(a.name.clone()))
}

fn author_articles(_: &dyn Any) -> Option<EntityHandle> {
    None
}

fn order_order_no(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Order>()
        .map_or(Value::Null, |o| Value::from(o.order_no))
}

fn order_region(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Order>()
        .map_or(Value::Null, |o| Value::from(o.region.clone()))
}

fn shipment_id(obj: &dyn Any) -> Value {
    obj.downcast_ref::<Shipment>()
        .map_or(Value::Null, |s| Value::from(s.id))
}

fn shipment_order(obj: &dyn Any) -> Option<EntityHandle> {
    obj.downcast_ref::<Shipment>().and_then(|s| s.order.clone())
}

// ----------------------------------------------------------------------
// Metadata
// ----------------------------------------------------------------------

pub(crate) fn category_meta() -> EntityMeta {
    EntityMeta::new("Category", "categories")
        .identity_generated(true)
        .with_field(FieldMeta::new("id", "id", SemanticType::BigInt, category_id))
        .with_field(FieldMeta::new(
            "name",
            "name",
            SemanticType::Text,
            category_name,
        ))
        .with_field(
            FieldMeta::new("slug", "slug", SemanticType::Text, category_slug)
                .owning_table("category_paths"),
        )
        .with_association(
            AssociationMeta::new("parent", "Category", category_parent)
                .self_referencing(true)
                .columns(&[("parent_id", "id")]),
        )
}

pub(crate) fn article_meta() -> EntityMeta {
    EntityMeta::new("Article", "articles")
        .identity_generated(true)
        .with_version_field("revision")
        .with_field(FieldMeta::new("id", "id", SemanticType::BigInt, article_id))
        .with_field(FieldMeta::new(
            "title",
            "title",
            SemanticType::Text,
            article_title,
        ))
        .with_field(FieldMeta::new(
            "published",
            "published",
            SemanticType::Boolean,
            article_published,
        ))
        .with_field(FieldMeta::new(
            "revision",
            "revision",
            SemanticType::BigInt,
            article_revision,
        ))
        .with_association(
            AssociationMeta::new("author", "Author", article_author)
                .columns(&[("author_id", "id")]),
        )
}

pub(crate) fn author_meta() -> EntityMeta {
    EntityMeta::new("Author", "authors")
        .identity_generated(true)
        .with_field(FieldMeta::new("id", "id", SemanticType::BigInt, author_id))
        .with_field(FieldMeta::new(
            "name",
            "name",
            SemanticType::Text,
            author_name,
        ))
        .with_association(
            AssociationMeta::new("articles", "Article", author_articles)
                .owning_side(false)
                .cardinality(Cardinality::ToMany),
        )
        .with_association(
            AssociationMeta::new("featured_article", "Article", author_articles)
                .owning_side(false)
                .columns(&[("featured_article_id", "id")]),
        )
}

pub(crate) fn order_meta() -> EntityMeta {
    EntityMeta::new("Order", "orders")
        .with_field(FieldMeta::new(
            "order_no",
            "order_no",
            SemanticType::BigInt,
            order_order_no,
        ))
        .with_field(FieldMeta::new(
            "region",
            "region",
            SemanticType::Text,
            order_region,
        ))
}

pub(crate) fn shipment_meta() -> EntityMeta {
    EntityMeta::new("Shipment", "shipments")
        .identity_generated(true)
        .with_field(FieldMeta::new(
            "id",
            "id",
            SemanticType::BigInt,
            shipment_id,
        ))
        .with_association(
            AssociationMeta::new("order", "Order", shipment_order)
                .columns(&[("order_no", "order_no"), ("order_region", "region")]),
        )
}

pub(crate) fn metadata() -> Rc<MetadataRegistry> {
    let mut registry = MetadataRegistry::new();
    registry.register(category_meta());
    registry.register(article_meta());
    registry.register(author_meta());
    registry.register(order_meta());
    registry.register(shipment_meta());
    Rc::new(registry)
}

// ----------------------------------------------------------------------
// Recording store
// ----------------------------------------------------------------------

/// One captured store call.
#[derive(Debug, Clone)]
pub(crate) enum StoreCall {
    Insert {
        table: String,
        data: ColumnMap,
    },
    Update {
        table: String,
        data: ColumnMap,
        predicate: ColumnMap,
    },
    Delete {
        table: String,
        predicate: ColumnMap,
    },
}

/// A store that records every call and can be scripted to fail.
pub(crate) struct RecordingStore {
    calls: Rc<RefCell<Vec<StoreCall>>>,
    fail_on_call: Option<usize>,
    on_insert: Option<Box<dyn FnMut(&str, &ColumnMap)>>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            fail_on_call: None,
            on_insert: None,
        }
    }

    /// Shared handle to the call log; clone before moving the store.
    pub(crate) fn log(&self) -> Rc<RefCell<Vec<StoreCall>>> {
        Rc::clone(&self.calls)
    }

    /// Fail the n-th call (1-based) with a constraint violation. The call is
    /// still recorded as issued.
    pub(crate) fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Run a callback after each successful insert — used to play the store
    /// assigning identity keys.
    pub(crate) fn on_insert(mut self, callback: impl FnMut(&str, &ColumnMap) + 'static) -> Self {
        self.on_insert = Some(Box::new(callback));
        self
    }

    fn check_failure(&self, table: &str) -> Result<()> {
        let issued = self.calls.borrow().len();
        if self.fail_on_call == Some(issued) {
            return Err(Error::Store(StoreError::new(
                StoreErrorKind::Constraint,
                table,
                "scripted failure",
            )));
        }
        Ok(())
    }
}

impl Store for RecordingStore {
    fn insert(&mut self, table: &str, data: &ColumnMap) -> Result<u64> {
        self.calls.borrow_mut().push(StoreCall::Insert {
            table: table.to_string(),
            data: data.clone(),
        });
        self.check_failure(table)?;
        if let Some(callback) = &mut self.on_insert {
            callback(table, data);
        }
        Ok(1)
    }

    fn update(&mut self, table: &str, data: &ColumnMap, predicate: &ColumnMap) -> Result<u64> {
        self.calls.borrow_mut().push(StoreCall::Update {
            table: table.to_string(),
            data: data.clone(),
            predicate: predicate.clone(),
        });
        self.check_failure(table)?;
        Ok(1)
    }

    fn delete(&mut self, table: &str, predicate: &ColumnMap) -> Result<u64> {
        self.calls.borrow_mut().push(StoreCall::Delete {
            table: table.to_string(),
            predicate: predicate.clone(),
        });
        self.check_failure(table)?;
        Ok(1)
    }
}

// ----------------------------------------------------------------------
// Scripted unit of work
// ----------------------------------------------------------------------

/// A unit of work playing back preloaded state.
pub(crate) struct ScriptedUow {
    scheduled: HashSet<EntityToken>,
    states: HashMap<EntityToken, PersistenceState>,
    identifiers: HashMap<EntityToken, ColumnMap>,
    change_sets: HashMap<EntityToken, ChangeRecord>,
    deferred: Rc<RefCell<Vec<DeferredUpdate>>>,
}

impl ScriptedUow {
    pub(crate) fn new() -> Self {
        Self {
            scheduled: HashSet::new(),
            states: HashMap::new(),
            identifiers: HashMap::new(),
            change_sets: HashMap::new(),
            deferred: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn schedule_insert(&mut self, token: EntityToken) {
        self.scheduled.insert(token);
    }

    pub(crate) fn set_state(&mut self, token: EntityToken, state: PersistenceState) {
        self.states.insert(token, state);
    }

    pub(crate) fn set_identifier(&mut self, token: EntityToken, identifier: ColumnMap) {
        self.identifiers.insert(token, identifier);
    }

    pub(crate) fn set_change_set(&mut self, token: EntityToken, changes: ChangeRecord) {
        self.change_sets.insert(token, changes);
    }

    /// The deferred updates scheduled so far.
    pub(crate) fn deferred(&self) -> Vec<DeferredUpdate> {
        self.deferred.borrow().clone()
    }

    /// Shared handle to the deferred queue; clone before moving the uow.
    pub(crate) fn deferred_log(&self) -> Rc<RefCell<Vec<DeferredUpdate>>> {
        Rc::clone(&self.deferred)
    }
}

impl UnitOfWork for ScriptedUow {
    fn is_scheduled_for_insert(&self, token: EntityToken) -> bool {
        self.scheduled.contains(&token)
    }

    fn persistence_state(&self, token: EntityToken) -> PersistenceState {
        self.states.get(&token).copied().unwrap_or_default()
    }

    fn schedule_deferred_update(&mut self, update: DeferredUpdate) {
        self.deferred.borrow_mut().push(update);
    }

    fn resolve_identifier(&self, entity: &EntityHandle) -> Result<ColumnMap> {
        self.identifiers
            .get(&entity.token())
            .cloned()
            .ok_or_else(|| {
                Error::Identifier(IdentifierError {
                    entity_type: entity.entity_type().to_string(),
                    field: "id".to_string(),
                })
            })
    }

    fn change_set_of(&self, token: EntityToken) -> ChangeRecord {
        self.change_sets.get(&token).cloned().unwrap_or_default()
    }
}

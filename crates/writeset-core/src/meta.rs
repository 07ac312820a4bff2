//! Entity mapping metadata.
//!
//! Metadata describes how an entity type maps onto its owning table: scalar
//! fields with their columns and semantic types, to-one/to-many associations
//! with their foreign-key column pairs, and the key-generation strategy.
//! Accessors are typed function pointers resolved once when the metadata is
//! built, so reading a field back out of a live object never goes through a
//! by-name lookup.

use crate::entity::EntityHandle;
use crate::error::{Error, MetadataError, Result};
use crate::types::SemanticType;
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// Reads one scalar field's current value out of an erased object.
pub type FieldGetter = fn(&dyn Any) -> Value;

/// Reads one to-one association's current target out of an erased object.
pub type AssocGetter = fn(&dyn Any) -> Option<EntityHandle>;

/// Cardinality of an association as seen from the mapped entity.
///
/// Only the to-one/to-many split matters to the write path: to-many
/// associations never store columns on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// The field references at most one target entity.
    #[default]
    ToOne,
    /// The field references a collection of target entities.
    ToMany,
}

/// Metadata about a mapped scalar field.
#[derive(Clone)]
pub struct FieldMeta {
    /// Field name on the domain object.
    pub name: &'static str,
    /// Column name in the owning table.
    pub column_name: &'static str,
    /// Declared semantic type, used for storage conversion on insert.
    pub semantic_type: SemanticType,
    /// Owning-table override for joined mappings; `None` means the entity's
    /// own table.
    pub owning_table: Option<&'static str>,
    /// Typed accessor for the field's current value.
    pub getter: FieldGetter,
}

impl FieldMeta {
    /// Create field metadata.
    pub fn new(
        name: &'static str,
        column_name: &'static str,
        semantic_type: SemanticType,
        getter: FieldGetter,
    ) -> Self {
        Self {
            name,
            column_name,
            semantic_type,
            owning_table: None,
            getter,
        }
    }

    /// Route this field's column to a different owning table.
    pub fn owning_table(mut self, table: &'static str) -> Self {
        self.owning_table = Some(table);
        self
    }
}

impl std::fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMeta")
            .field("name", &self.name)
            .field("column_name", &self.column_name)
            .field("semantic_type", &self.semantic_type)
            .field("owning_table", &self.owning_table)
            .finish_non_exhaustive()
    }
}

/// Metadata about a mapped association.
#[derive(Clone)]
pub struct AssociationMeta {
    /// Field name on the domain object.
    pub field_name: &'static str,
    /// Whether this side physically stores the foreign-key columns.
    pub owning_side: bool,
    /// To-one or to-many, as seen from this entity.
    pub cardinality: Cardinality,
    /// Whether source and target are the same entity type.
    pub self_referencing: bool,
    /// Ordered (source column, target column) pairs; the source columns live
    /// in this association's owning table.
    pub source_to_target_columns: &'static [(&'static str, &'static str)],
    /// Entity-type name of the association target.
    pub target_entity: &'static str,
    /// Owning-table override for joined mappings.
    pub owning_table: Option<&'static str>,
    /// Typed accessor for the association's current target.
    pub getter: AssocGetter,
}

impl AssociationMeta {
    /// Create association metadata for an owning-side to-one field.
    ///
    /// Defaults: owning side, to-one, not self-referencing, no column pairs.
    pub fn new(field_name: &'static str, target_entity: &'static str, getter: AssocGetter) -> Self {
        Self {
            field_name,
            owning_side: true,
            cardinality: Cardinality::ToOne,
            self_referencing: false,
            source_to_target_columns: &[],
            target_entity,
            owning_table: None,
            getter,
        }
    }

    /// Set the owning-side flag.
    pub fn owning_side(mut self, value: bool) -> Self {
        self.owning_side = value;
        self
    }

    /// Set the cardinality.
    pub fn cardinality(mut self, value: Cardinality) -> Self {
        self.cardinality = value;
        self
    }

    /// Mark the association as self-referencing.
    pub fn self_referencing(mut self, value: bool) -> Self {
        self.self_referencing = value;
        self
    }

    /// Set the ordered (source, target) foreign-key column pairs.
    pub fn columns(mut self, pairs: &'static [(&'static str, &'static str)]) -> Self {
        self.source_to_target_columns = pairs;
        self
    }

    /// Route this association's columns to a different owning table.
    pub fn owning_table(mut self, table: &'static str) -> Self {
        self.owning_table = Some(table);
        self
    }

    /// Whether the write path may emit columns for this association.
    pub fn writes_columns(&self) -> bool {
        self.owning_side && self.cardinality == Cardinality::ToOne
    }
}

impl std::fmt::Debug for AssociationMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationMeta")
            .field("field_name", &self.field_name)
            .field("owning_side", &self.owning_side)
            .field("cardinality", &self.cardinality)
            .field("self_referencing", &self.self_referencing)
            .field("source_to_target_columns", &self.source_to_target_columns)
            .field("target_entity", &self.target_entity)
            .finish_non_exhaustive()
    }
}

/// Complete mapping metadata for one entity type.
#[derive(Debug, Clone)]
pub struct EntityMeta {
    /// Entity-type name, the metadata lookup key.
    pub entity_type: &'static str,
    /// The table holding this entity's columns unless overridden per field.
    pub owning_table: &'static str,
    /// Mapped scalar fields, in declaration order.
    pub fields: Vec<FieldMeta>,
    /// Mapped associations, in declaration order.
    pub associations: Vec<AssociationMeta>,
    /// Whether the primary key is assigned by the store on insert.
    pub identity_generated_key: bool,
    /// The optimistic-lock field maintained by the store, if any.
    pub version_field: Option<&'static str>,
}

impl EntityMeta {
    /// Create metadata for an entity type with no fields yet.
    pub fn new(entity_type: &'static str, owning_table: &'static str) -> Self {
        Self {
            entity_type,
            owning_table,
            fields: Vec::new(),
            associations: Vec::new(),
            identity_generated_key: false,
            version_field: None,
        }
    }

    /// Append a scalar field.
    pub fn with_field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    /// Append an association.
    pub fn with_association(mut self, assoc: AssociationMeta) -> Self {
        self.associations.push(assoc);
        self
    }

    /// Mark the primary key as identity-generated.
    pub fn identity_generated(mut self, value: bool) -> Self {
        self.identity_generated_key = value;
        self
    }

    /// Declare the version field.
    pub fn with_version_field(mut self, name: &'static str) -> Self {
        self.version_field = Some(name);
        self
    }

    /// Look up a scalar field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up an association by field name.
    pub fn association(&self, field_name: &str) -> Option<&AssociationMeta> {
        self.associations.iter().find(|a| a.field_name == field_name)
    }

    /// Resolve the field name backing a column.
    ///
    /// Scalar columns map to their field; an association's source column maps
    /// to the association field, which is how composite and foreign
    /// identifiers are resolved.
    pub fn field_for_column(&self, column: &str) -> Option<&'static str> {
        if let Some(field) = self.fields.iter().find(|f| f.column_name == column) {
            return Some(field.name);
        }
        self.associations
            .iter()
            .find(|a| {
                a.source_to_target_columns
                    .iter()
                    .any(|(source, _)| *source == column)
            })
            .map(|a| a.field_name)
    }

    /// The effective owning table for a field or association.
    pub fn owning_table_of(&self, field_name: &str) -> &'static str {
        if let Some(field) = self.field(field_name) {
            return field.owning_table.unwrap_or(self.owning_table);
        }
        if let Some(assoc) = self.association(field_name) {
            return assoc.owning_table.unwrap_or(self.owning_table);
        }
        self.owning_table
    }

    /// Whether a field is the version field.
    pub fn is_version_field(&self, name: &str) -> bool {
        self.version_field == Some(name)
    }
}

/// Supplies entity metadata by type name.
///
/// How metadata gets described is outside this core; the provider is the
/// seam. `describe` is expected to hand back the same shared table on every
/// call for a given type.
pub trait MetadataProvider {
    /// Describe an entity type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Metadata`] when the type is unknown; callers treat
    /// that as fatal and propagate it.
    fn describe(&self, entity_type: &str) -> Result<Rc<EntityMeta>>;
}

/// A plain in-memory [`MetadataProvider`].
///
/// Types are registered up front; each registration is shared out as-is on
/// every describe call.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    types: HashMap<&'static str, Rc<EntityMeta>>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata for its entity type, replacing any previous entry.
    pub fn register(&mut self, meta: EntityMeta) {
        self.types.insert(meta.entity_type, Rc::new(meta));
    }
}

impl MetadataProvider for MetadataRegistry {
    fn describe(&self, entity_type: &str) -> Result<Rc<EntityMeta>> {
        self.types.get(entity_type).cloned().ok_or_else(|| {
            Error::Metadata(MetadataError {
                entity_type: entity_type.to_string(),
            })
        })
    }
}

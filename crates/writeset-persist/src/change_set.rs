//! Change-set building.
//!
//! The builder turns an entity into the exact column-level data to write:
//! a full snapshot for inserts, a diff-driven, table-grouped map for updates.
//! Association handling is delegated to the
//! [`AssociationResolver`](crate::resolver::AssociationResolver) on the
//! insert path and to identifier resolution on the update path.

use crate::registry::PendingInserts;
use crate::resolver::AssociationResolver;
use crate::unit_of_work::{ChangeValue, DeferredUpdate, UnitOfWork};
use writeset_core::{
    ColumnMap, EntityHandle, EntityMeta, Error, IdentifierError, MetadataProvider, Result,
    TypeConverter, Value,
};

/// Update data grouped by owning table.
///
/// A single entity may span multiple owning tables in a joined mapping, so
/// the update path groups its column data per table. Tables appear in
/// first-write order and only ever with at least one column.
#[derive(Debug, Default)]
pub struct UpdateSet {
    tables: Vec<(&'static str, ColumnMap)>,
}

impl UpdateSet {
    /// The column slice for a table, if any columns were produced for it.
    pub fn table(&self, name: &str) -> Option<&ColumnMap> {
        self.tables
            .iter()
            .find(|(table, _)| *table == name)
            .map(|(_, columns)| columns)
    }

    /// Iterate table slices in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ColumnMap)> {
        self.tables.iter().map(|(table, columns)| (*table, columns))
    }

    /// Number of tables with column data.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table has column data.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get or create the slice for a table.
    fn slot(&mut self, table: &'static str) -> &mut ColumnMap {
        if let Some(index) = self.tables.iter().position(|(name, _)| *name == table) {
            return &mut self.tables[index].1;
        }
        self.tables.push((table, ColumnMap::new()));
        let last = self.tables.len() - 1;
        &mut self.tables[last].1
    }
}

/// Builds insert and update column data for one entity type.
///
/// A builder is constructed per executor call and borrows its collaborators;
/// it holds no state of its own between calls.
pub struct ChangeSetBuilder<'a> {
    meta: &'a EntityMeta,
    metadata: &'a dyn MetadataProvider,
    converter: &'a dyn TypeConverter,
    pending: &'a PendingInserts,
    uow: &'a mut dyn UnitOfWork,
}

impl<'a> ChangeSetBuilder<'a> {
    /// Create a builder for one entity type.
    pub fn new(
        meta: &'a EntityMeta,
        metadata: &'a dyn MetadataProvider,
        converter: &'a dyn TypeConverter,
        pending: &'a PendingInserts,
        uow: &'a mut dyn UnitOfWork,
    ) -> Self {
        Self {
            meta,
            metadata,
            converter,
            pending,
            uow,
        }
    }

    /// Build the full insert snapshot for an entity.
    ///
    /// Scalar values pass through the type converter; association columns are
    /// computed by the resolver, which may schedule deferred updates as a
    /// side effect. Non-owning and to-many associations contribute nothing.
    /// The result covers the entity's owning table only.
    pub fn insert_data(&mut self, entity: &EntityHandle) -> Result<ColumnMap> {
        let mut data = ColumnMap::new();

        for field in &self.meta.fields {
            if field.owning_table.is_some_and(|t| t != self.meta.owning_table) {
                // Single-table insert: columns routed elsewhere are not ours.
                tracing::trace!(field = field.name, "field routed to secondary table; skipping");
                continue;
            }
            let value = (field.getter)(&*entity.borrow());
            if value.is_null() {
                data.set(field.column_name, Value::Null);
            } else {
                data.set(
                    field.column_name,
                    self.converter.to_storage_value(field.semantic_type, value)?,
                );
            }
        }

        for assoc in &self.meta.associations {
            if !assoc.writes_columns() {
                continue;
            }
            if assoc.owning_table.is_some_and(|t| t != self.meta.owning_table) {
                continue;
            }
            let mut resolver =
                AssociationResolver::new(self.meta, self.metadata, self.pending, &mut *self.uow);
            for (column, value) in resolver.resolve_to_one(entity, assoc, true)? {
                data.set(column, value);
            }
        }

        tracing::trace!(
            entity_type = self.meta.entity_type,
            columns = data.len(),
            "built insert snapshot"
        );
        Ok(data)
    }

    /// Build the diff-driven update data for an entity, grouped by table.
    ///
    /// The change record comes from the unit of work. The version field is
    /// excluded (the store maintains it); associations are written only from
    /// the owning to-one side; a changed-to pending target becomes null
    /// columns plus a deferred update. Scalar values are written through raw,
    /// without semantic-type conversion — the insert path converts, this path
    /// does not, preserving the observed behavior of the system this core
    /// reimplements.
    pub fn update_data(&mut self, entity: &EntityHandle) -> Result<UpdateSet> {
        let changes = self.uow.change_set_of(entity.token());
        let mut result = UpdateSet::default();

        for (field_name, change) in changes.iter() {
            if self.meta.is_version_field(field_name) {
                continue;
            }

            if let Some(assoc) = self.meta.association(field_name) {
                if !assoc.writes_columns() {
                    continue;
                }
                let table = self.meta.owning_table_of(assoc.field_name);

                let mut new_target = match &change.new {
                    ChangeValue::Entity(target) => target.clone(),
                    ChangeValue::Scalar(value) if value.is_null() => None,
                    ChangeValue::Scalar(value) => {
                        tracing::trace!(
                            field = field_name,
                            value_type = value.type_name(),
                            "scalar change recorded for association field; skipping"
                        );
                        continue;
                    }
                };

                if let Some(target) = &new_target {
                    let token = target.token();
                    if self.pending.contains(token) || self.uow.is_scheduled_for_insert(token) {
                        // The new target has no row yet: store null and
                        // re-link through a deferred update.
                        self.uow.schedule_deferred_update(DeferredUpdate {
                            entity: entity.clone(),
                            field: assoc.field_name,
                            old_value: None,
                            new_value: Some(target.clone()),
                        });
                        new_target = None;
                    }
                }

                match new_target {
                    None => {
                        for (source, _) in assoc.source_to_target_columns {
                            result.slot(table).set(*source, Value::Null);
                        }
                    }
                    Some(target) => {
                        let target_meta = self.metadata.describe(assoc.target_entity)?;
                        let identifier = self.uow.resolve_identifier(&target)?;
                        for (source, target_column) in assoc.source_to_target_columns {
                            let field = target_meta.field_for_column(target_column).ok_or_else(
                                || {
                                    Error::Identifier(IdentifierError {
                                        entity_type: target_meta.entity_type.to_string(),
                                        field: (*target_column).to_string(),
                                    })
                                },
                            )?;
                            let value = identifier.get(field).cloned().ok_or_else(|| {
                                Error::Identifier(IdentifierError {
                                    entity_type: target_meta.entity_type.to_string(),
                                    field: field.to_string(),
                                })
                            })?;
                            result.slot(table).set(*source, value);
                        }
                    }
                }
            } else if let Some(field) = self.meta.field(field_name) {
                let value = match &change.new {
                    ChangeValue::Scalar(value) => value.clone(),
                    ChangeValue::Entity(_) => continue,
                };
                let table = self.meta.owning_table_of(field.name);
                result.slot(table).set(field.column_name, value);
            } else {
                tracing::trace!(
                    entity_type = self.meta.entity_type,
                    field = field_name,
                    "change recorded for unmapped field; skipping"
                );
            }
        }

        tracing::trace!(
            entity_type = self.meta.entity_type,
            tables = result.len(),
            "built update data"
        );
        Ok(result)
    }
}

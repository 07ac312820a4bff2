//! Core types and traits for Writeset.
//!
//! `writeset-core` holds the leaf vocabulary shared by the write path and its
//! collaborators:
//!
//! - [`Value`] and [`ColumnMap`] — the column-level data every write is made of
//! - [`EntityHandle`] / [`EntityToken`] — caller-owned objects and their
//!   identity tokens
//! - [`EntityMeta`] and friends — per-type mapping metadata with typed
//!   accessor tables, plus the [`MetadataProvider`] seam
//! - [`Store`] — the synchronous store-driver seam
//! - [`TypeConverter`] — the semantic-type conversion seam
//! - [`Error`] — structured errors with no retry policy attached

pub mod column_map;
pub mod convert;
pub mod entity;
pub mod error;
pub mod meta;
pub mod store;
pub mod types;
pub mod value;

pub use column_map::ColumnMap;
pub use convert::{StandardConverter, TypeConverter};
pub use entity::{EntityHandle, EntityToken};
pub use error::{
    Error, IdentifierError, MetadataError, Result, StoreError, StoreErrorKind,
};
pub use meta::{
    AssocGetter, AssociationMeta, Cardinality, EntityMeta, FieldGetter, FieldMeta,
    MetadataProvider, MetadataRegistry,
};
pub use store::Store;
pub use types::SemanticType;
pub use value::Value;

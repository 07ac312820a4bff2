//! Store write trait.
//!
//! The store driver is an external collaborator: this core computes column
//! maps and routes them; how a driver turns a map into SQL (or anything else)
//! is its own business. All calls block the caller — the write path is fully
//! synchronous and has no suspension points.

use crate::column_map::ColumnMap;
use crate::error::Result;

/// A synchronous store accepting single-table writes.
///
/// Implementations translate each call into one statement against the
/// backing store and report the affected-row count. Errors are returned
/// as-is; this core never retries and never compensates.
pub trait Store {
    /// Insert one row.
    fn insert(&mut self, table: &str, data: &ColumnMap) -> Result<u64>;

    /// Update rows matching the predicate.
    ///
    /// The predicate is a column-to-value equality map, ANDed together.
    fn update(&mut self, table: &str, data: &ColumnMap, predicate: &ColumnMap) -> Result<u64>;

    /// Delete rows matching the predicate.
    fn delete(&mut self, table: &str, predicate: &ColumnMap) -> Result<u64>;
}

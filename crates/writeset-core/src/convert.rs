//! Semantic-type to storage-value conversion.

use crate::error::Result;
use crate::types::SemanticType;
use crate::value::Value;

/// Converts field values to their storage form.
///
/// Conversion runs on the insert path only: insert snapshots pass every
/// non-null scalar through `to_storage_value`, while the update path writes
/// changed values through raw. That asymmetry is observed behavior carried
/// over from the system this core reimplements, not an accident of this
/// trait.
pub trait TypeConverter {
    /// Lower a value of the given semantic type to its storage form.
    fn to_storage_value(&self, semantic_type: SemanticType, value: Value) -> Result<Value>;
}

/// The default conversion registry.
///
/// Normalizes the handful of semantic types whose storage form differs from
/// their in-memory form and passes everything else through unchanged. Nulls
/// never reach a converter; the change-set builder writes them directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConverter;

impl StandardConverter {
    /// Create the standard converter.
    pub fn new() -> Self {
        Self
    }
}

impl TypeConverter for StandardConverter {
    fn to_storage_value(&self, semantic_type: SemanticType, value: Value) -> Result<Value> {
        let converted = match (semantic_type, value) {
            // Booleans are stored as small integers.
            (SemanticType::Boolean, Value::Bool(v)) => Value::SmallInt(i16::from(v)),
            // Decimals travel as their canonical string form.
            (SemanticType::Decimal, Value::Float(v)) => Value::Decimal(v.to_string()),
            (SemanticType::Decimal, Value::Double(v)) => Value::Decimal(v.to_string()),
            // UUIDs are stored as raw bytes.
            (SemanticType::Uuid, Value::Uuid(bytes)) => Value::Bytes(bytes.to_vec()),
            // JSON is stored as its serialized text.
            (SemanticType::Json, Value::Json(v)) => Value::Text(v.to_string()),
            (_, other) => other,
        };
        Ok(converted)
    }
}

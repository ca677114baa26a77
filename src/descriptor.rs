//! The canonical field descriptor record

use serde::{Deserialize, Serialize};

use crate::wire::{Label, WireKind};

/// Schema-compiler-consumable metadata for one field
///
/// Shape-compatible with the standard field-descriptor schema:
/// `{name, number, label, type, type_name?, json_name?, proto3_optional}`.
/// Immutable once produced; the owning [`FieldSpec`](crate::FieldSpec)
/// caches it on first resolution and serves the same value thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Declared field name, supplied by the owning message at bind time
    pub name: String,
    /// Wire field number
    pub number: u32,
    /// Cardinality label
    pub label: Label,
    /// Effective wire type (enums resolve to INT32, never ENUM)
    #[serde(rename = "type")]
    pub kind: WireKind,
    /// Fully-qualified linked type name, for message-typed fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Alternate name for JSON-format serialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    /// Explicit presence tracking for an otherwise implicit-presence scalar
    pub proto3_optional: bool,
}

impl FieldDescriptor {
    /// Whether this descriptor describes a repeated field
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

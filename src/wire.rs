//! Wire type tags and cardinality labels
//!
//! Discriminants match the standard field-descriptor numbering so the
//! produced records stay bit-compatible with the serialization runtime.

use serde::{Deserialize, Serialize};

/// Scalar or structural wire type tag for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum WireKind {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    /// Deprecated group encoding; kept for descriptor numbering parity
    Group = 10,
    /// Embedded message; the descriptor carries the linked type name
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    /// Enumeration; serialized as a plain int32 on the wire
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl WireKind {
    /// The raw descriptor type number
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Look up a kind by its raw descriptor type number
    pub fn from_i32(value: i32) -> Option<Self> {
        use WireKind::*;
        Some(match value {
            1 => Double,
            2 => Float,
            3 => Int64,
            4 => Uint64,
            5 => Int32,
            6 => Fixed64,
            7 => Fixed32,
            8 => Bool,
            9 => String,
            10 => Group,
            11 => Message,
            12 => Bytes,
            13 => Uint32,
            14 => Enum,
            15 => Sfixed32,
            16 => Sfixed64,
            17 => Sint32,
            18 => Sint64,
            _ => return None,
        })
    }

    /// Whether this kind is a plain scalar (not message, enum, or group)
    pub fn is_scalar(self) -> bool {
        !matches!(self, WireKind::Message | WireKind::Enum | WireKind::Group)
    }

    /// Whether this kind may be used as a map key.
    ///
    /// Map keys must be hashable: integral, bool, or string kinds. Float,
    /// bytes, message, and enum keys are rejected by conforming schema
    /// compilers. Map field construction does not enforce this; enforcement
    /// belongs to the compiler that synthesizes the map entry message.
    pub fn valid_map_key(self) -> bool {
        matches!(
            self,
            WireKind::Int32
                | WireKind::Int64
                | WireKind::Uint32
                | WireKind::Uint64
                | WireKind::Sint32
                | WireKind::Sint64
                | WireKind::Fixed32
                | WireKind::Fixed64
                | WireKind::Sfixed32
                | WireKind::Sfixed64
                | WireKind::Bool
                | WireKind::String
        )
    }
}

/// Cardinality label for a field
///
/// Proto3 schemas never emit `Required`; it exists for descriptor
/// numbering parity with proto2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Label {
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

impl Label {
    /// The raw descriptor label number
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

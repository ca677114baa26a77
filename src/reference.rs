//! Linked type references
//!
//! Fields may reference message or enum types that do not yet exist at
//! declaration time (forward references, self-references, cross-file
//! references). These interfaces are the contract such types must satisfy
//! when resolution eventually runs; this crate never owns the referenced
//! types, it only borrows them through shared handles.

use std::fmt;
use std::sync::Arc;

/// A message type a field may link to
///
/// Resolution asks for a fully-qualified name through one of two
/// capabilities, in order: [`descriptor_full_name`] (the serialization
/// descriptor convention), then [`meta_full_name`] (internal metadata
/// fallback). A type exposing neither is unresolvable and descriptor
/// construction fails.
///
/// [`descriptor_full_name`]: MessageType::descriptor_full_name
/// [`meta_full_name`]: MessageType::meta_full_name
pub trait MessageType: fmt::Debug + Send + Sync {
    /// Fully-qualified dotted name per the serialization descriptor
    fn descriptor_full_name(&self) -> Option<String> {
        None
    }

    /// Fully-qualified dotted name from internal metadata
    fn meta_full_name(&self) -> Option<String> {
        None
    }

    /// The underlying runtime type, for declarative wrappers
    ///
    /// Declarative message definitions wrap a raw descriptor-bearing type;
    /// [`FieldSpec::pb_type`](crate::FieldSpec::pb_type) follows this one
    /// level of indirection. Raw types return `None`.
    fn runtime_type(&self) -> Option<Arc<dyn MessageType>> {
        None
    }
}

/// An enumeration type a field may link to
///
/// The wire format treats enum values as plain int32; this crate never
/// builds enum descriptors, so the only thing asked of an enum type is a
/// name for diagnostics.
pub trait EnumType: fmt::Debug + Send + Sync {
    /// Fully-qualified dotted name of the enumeration
    fn full_name(&self) -> String;
}

/// A reference to a linked message type
///
/// Either a (possibly package-relative) name string resolved lazily, or a
/// shared handle to the type itself. Name references not prefixed by the
/// owning field's package are rewritten to their fully-qualified form the
/// first time a descriptor is built.
#[derive(Debug, Clone)]
pub enum MessageRef {
    /// By-name reference; supports forward and cross-file references
    Name(String),
    /// By-object reference to an already-declared type
    Type(Arc<dyn MessageType>),
}

impl MessageRef {
    /// The current name string, for by-name references
    pub fn name(&self) -> Option<&str> {
        match self {
            MessageRef::Name(name) => Some(name),
            MessageRef::Type(_) => None,
        }
    }
}

/// Composite runtime type of a field, returned by
/// [`FieldSpec::pb_type`](crate::FieldSpec::pb_type)
#[derive(Debug, Clone)]
pub enum PbType {
    /// The linked enumeration type
    Enum(Arc<dyn EnumType>),
    /// The linked message type, unwrapped to its runtime form
    Message(Arc<dyn MessageType>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Bare;
    impl MessageType for Bare {}

    #[test]
    fn test_default_capabilities_absent() {
        let bare = Bare;
        assert!(bare.descriptor_full_name().is_none());
        assert!(bare.meta_full_name().is_none());
        assert!(bare.runtime_type().is_none());
    }

    #[test]
    fn test_ref_name_accessor() {
        let by_name = MessageRef::Name("pkg.v1.Thing".to_string());
        assert_eq!(by_name.name(), Some("pkg.v1.Thing"));

        let by_type = MessageRef::Type(Arc::new(Bare));
        assert!(by_type.name().is_none());
    }
}

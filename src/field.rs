//! Field descriptor builder
//!
//! A [`FieldSpec`] captures the declared shape of one message field and
//! lazily resolves it into a [`FieldDescriptor`]. Construction happens in
//! two phases: the schema author declares the field, then the owning
//! message's assembly pass calls [`bind`](FieldSpec::bind) exactly once with
//! the declared name and package. Fields are declared before they know which
//! message they belong to, so the descriptor cannot be built any earlier.
//!
//! Resolution is memoized: the first `descriptor()` call computes the record
//! and every later call returns the same value, even if a linked type is
//! mutated afterward. This resolve-once invariant is deliberate; schema
//! assembly finishes before any consumer reads descriptors.

use std::ops::Deref;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::descriptor::FieldDescriptor;
use crate::error::{FieldError, Result};
use crate::reference::{EnumType, MessageRef, MessageType, PbType};
use crate::wire::{Label, WireKind};

/// Late-bound (name, package) context attached by the owning message
#[derive(Debug)]
struct Binding {
    name: String,
    package: String,
}

/// State touched during descriptor resolution
///
/// The message reference lives here rather than on `FieldSpec` directly
/// because resolution rewrites package-relative name references to their
/// fully-qualified form. One guard covers both that write-back and the
/// cache, so resolution is at-most-once even with concurrent readers.
#[derive(Debug)]
struct Resolution {
    message: Option<MessageRef>,
    cached: Option<FieldDescriptor>,
}

/// The declared shape of one field in a message type
#[derive(Debug)]
pub struct FieldSpec {
    number: u32,
    kind: WireKind,
    enumeration: Option<Arc<dyn EnumType>>,
    json_name: Option<String>,
    optional: bool,
    oneof: Option<String>,
    repeated: bool,
    map_key: Option<WireKind>,
    binding: OnceCell<Binding>,
    resolution: Mutex<Resolution>,
}

impl FieldSpec {
    fn new(
        kind: WireKind,
        number: u32,
        message: Option<MessageRef>,
        enumeration: Option<Arc<dyn EnumType>>,
    ) -> Self {
        assert!(number > 0, "field number must be a positive integer");
        Self {
            number,
            kind,
            enumeration,
            json_name: None,
            optional: false,
            oneof: None,
            repeated: false,
            map_key: None,
            binding: OnceCell::new(),
            resolution: Mutex::new(Resolution {
                message,
                cached: None,
            }),
        }
    }

    /// Declare a scalar field
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero. Uniqueness across sibling fields and
    /// reserved-range checks belong to the owning message builder.
    pub fn scalar(kind: WireKind, number: u32) -> Self {
        debug_assert!(
            kind.is_scalar(),
            "composite fields use message()/message_named()/enumeration()"
        );
        Self::new(kind, number, None, None)
    }

    /// Declare a field embedding an already-declared message type
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn message(ty: Arc<dyn MessageType>, number: u32) -> Self {
        Self::new(WireKind::Message, number, Some(MessageRef::Type(ty)), None)
    }

    /// Declare a message-typed field by name
    ///
    /// The name may be fully qualified or relative to the field's package;
    /// relative names are qualified at resolution time. This is the path
    /// for forward, self, and cross-file references.
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn message_named(name: impl Into<String>, number: u32) -> Self {
        Self::new(
            WireKind::Message,
            number,
            Some(MessageRef::Name(name.into())),
            None,
        )
    }

    /// Declare an enum-typed field
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn enumeration(ty: Arc<dyn EnumType>, number: u32) -> Self {
        Self::new(WireKind::Enum, number, None, Some(ty))
    }

    /// Set the alternate name used for JSON-format serialization
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = Some(json_name.into());
        self
    }

    /// Place this field in a named oneof group
    pub fn with_oneof(mut self, oneof: impl Into<String>) -> Self {
        self.oneof = Some(oneof.into());
        self
    }

    /// Mark this field as proto3 optional (explicit presence tracking)
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    fn into_repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    fn with_map_key(mut self, key: WireKind) -> Self {
        self.map_key = Some(key);
        self
    }

    /// Attach the declared name and package, exactly once
    ///
    /// Called by the owning message's assembly pass after it has collected
    /// the declared fields. Must happen before `name()`, `package()`, or
    /// `descriptor()`.
    pub fn bind(&self, name: impl Into<String>, package: impl Into<String>) -> Result<()> {
        let binding = Binding {
            name: name.into(),
            package: package.into(),
        };
        match self.binding.try_insert(binding) {
            Ok(_) => Ok(()),
            Err((bound, _)) => Err(FieldError::AlreadyBound {
                name: bound.name.clone(),
                package: bound.package.clone(),
            }),
        }
    }

    /// The declared field name
    pub fn name(&self) -> Result<&str> {
        self.binding
            .get()
            .map(|b| b.name.as_str())
            .ok_or(FieldError::MissingContext { accessor: "name" })
    }

    /// The package of the owning message
    pub fn package(&self) -> Result<&str> {
        self.binding
            .get()
            .map(|b| b.package.as_str())
            .ok_or(FieldError::MissingContext { accessor: "package" })
    }

    /// The wire field number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The declared wire kind (MESSAGE/ENUM for composite fields)
    pub fn kind(&self) -> WireKind {
        self.kind
    }

    /// The oneof group this field belongs to, if any
    pub fn oneof(&self) -> Option<&str> {
        self.oneof.as_deref()
    }

    /// Whether this field holds a sequence of values
    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// The declared map key kind, for map fields
    pub fn map_key(&self) -> Option<WireKind> {
        self.map_key
    }

    /// The current name of a by-name message reference
    ///
    /// Reflects the fully-qualified rewrite once `descriptor()` has run.
    /// `None` for by-object references and non-message fields.
    pub fn message_type_name(&self) -> Option<String> {
        let resolution = self.lock_resolution();
        resolution
            .message
            .as_ref()
            .and_then(|m| m.name().map(str::to_string))
    }

    /// Resolve and return the wire descriptor for this field
    ///
    /// Computed once, on first access; repeat calls return a value equal to
    /// the first. Package-relative name references are rewritten to
    /// `<package>.<name>` as part of resolution.
    pub fn descriptor(&self) -> Result<FieldDescriptor> {
        let binding = self.binding.get().ok_or(FieldError::MissingContext {
            accessor: "descriptor",
        })?;

        let mut resolution = self.lock_resolution();
        if let Some(cached) = &resolution.cached {
            return Ok(cached.clone());
        }

        let mut kind = self.kind;
        let type_name = match &mut resolution.message {
            Some(MessageRef::Name(name)) => {
                // Qualify relative names in place, under the same guard
                // that populates the cache.
                if !name.starts_with(&binding.package) {
                    *name = format!("{}.{}", binding.package, name);
                }
                Some(name.clone())
            }
            Some(MessageRef::Type(ty)) => {
                let full_name = ty
                    .descriptor_full_name()
                    .or_else(|| ty.meta_full_name())
                    .ok_or_else(|| FieldError::UnresolvableReference {
                        field: binding.name.clone(),
                    })?;
                Some(full_name)
            }
            None => {
                if self.enumeration.is_some() {
                    // As far as the wire format is concerned, enums are
                    // int32s; the enum object only translates between names
                    // and values. Enum descriptors are not modeled here.
                    kind = WireKind::Int32;
                }
                None
            }
        };

        debug!(
            field = %binding.name,
            number = self.number,
            kind = ?kind,
            type_name = type_name.as_deref().unwrap_or(""),
            "resolved field descriptor"
        );

        let descriptor = FieldDescriptor {
            name: binding.name.clone(),
            number: self.number,
            label: if self.repeated {
                Label::Repeated
            } else {
                Label::Optional
            },
            kind,
            type_name,
            json_name: self.json_name.clone(),
            proto3_optional: self.optional,
        };
        resolution.cached = Some(descriptor.clone());
        Ok(descriptor)
    }

    /// The composite runtime type of this field, or `None` for scalars
    ///
    /// Enum-typed fields return the enum type; message-typed fields return
    /// the message type, unwrapping declarative wrappers to their runtime
    /// form. By-name references carry no runtime type and return `None`
    /// (the name itself is available via [`message_type_name`]). Does not
    /// touch the descriptor cache.
    ///
    /// [`message_type_name`]: FieldSpec::message_type_name
    pub fn pb_type(&self) -> Option<PbType> {
        if let Some(en) = &self.enumeration {
            return Some(PbType::Enum(Arc::clone(en)));
        }
        let resolution = self.lock_resolution();
        match &resolution.message {
            Some(MessageRef::Type(ty)) => {
                let runtime = ty.runtime_type().unwrap_or_else(|| Arc::clone(ty));
                Some(PbType::Message(runtime))
            }
            _ => None,
        }
    }

    fn lock_resolution(&self) -> std::sync::MutexGuard<'_, Resolution> {
        // Resolution writes the cache last, so state behind a poisoned
        // guard is still consistent.
        self.resolution
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A field holding a sequence of values
///
/// Structurally a [`FieldSpec`] with the repeated flag forced on; element
/// types are restricted to scalar, message, or enum kinds.
#[derive(Debug)]
pub struct RepeatedField(FieldSpec);

impl RepeatedField {
    /// Declare a repeated scalar field
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn scalar(kind: WireKind, number: u32) -> Self {
        Self(FieldSpec::scalar(kind, number).into_repeated())
    }

    /// Declare a repeated message-typed field
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn message(ty: Arc<dyn MessageType>, number: u32) -> Self {
        Self(FieldSpec::message(ty, number).into_repeated())
    }

    /// Declare a repeated message-typed field by name
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn message_named(name: impl Into<String>, number: u32) -> Self {
        Self(FieldSpec::message_named(name, number).into_repeated())
    }

    /// Declare a repeated enum-typed field
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn enumeration(ty: Arc<dyn EnumType>, number: u32) -> Self {
        Self(FieldSpec::enumeration(ty, number).into_repeated())
    }
}

impl Deref for RepeatedField {
    type Target = FieldSpec;

    fn deref(&self) -> &FieldSpec {
        &self.0
    }
}

/// A map field
///
/// Recorded as a repeated field of the value kind/type plus the declared
/// key kind. The schema compiler that consumes the descriptor synthesizes
/// the implicit map-entry message with `key` and `value` sub-fields; this
/// crate only records the pieces. Key kinds must satisfy
/// [`WireKind::valid_map_key`]; that restriction is the caller's to enforce.
#[derive(Debug)]
pub struct MapField(FieldSpec);

impl MapField {
    /// Declare a map field with a scalar value kind
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn scalar(key: WireKind, value: WireKind, number: u32) -> Self {
        Self(FieldSpec::scalar(value, number).into_repeated().with_map_key(key))
    }

    /// Declare a map field with a message-typed value
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn message(key: WireKind, ty: Arc<dyn MessageType>, number: u32) -> Self {
        Self(FieldSpec::message(ty, number).into_repeated().with_map_key(key))
    }

    /// Declare a map field with a message-typed value, by name
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn message_named(key: WireKind, name: impl Into<String>, number: u32) -> Self {
        Self(FieldSpec::message_named(name, number).into_repeated().with_map_key(key))
    }

    /// Declare a map field with an enum-typed value
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn enumeration(key: WireKind, ty: Arc<dyn EnumType>, number: u32) -> Self {
        Self(FieldSpec::enumeration(ty, number).into_repeated().with_map_key(key))
    }
}

impl Deref for MapField {
    type Target = FieldSpec;

    fn deref(&self) -> &FieldSpec {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct RawMessage {
        full_name: &'static str,
    }

    impl MessageType for RawMessage {
        fn descriptor_full_name(&self) -> Option<String> {
            Some(self.full_name.to_string())
        }
    }

    #[derive(Debug)]
    struct MetaOnlyMessage;

    impl MessageType for MetaOnlyMessage {
        fn meta_full_name(&self) -> Option<String> {
            Some("pkg.v1.MetaOnly".to_string())
        }
    }

    #[derive(Debug)]
    struct OpaqueMessage;

    impl MessageType for OpaqueMessage {}

    #[derive(Debug)]
    struct Color;

    impl EnumType for Color {
        fn full_name(&self) -> String {
            "pkg.v1.Color".to_string()
        }
    }

    #[test]
    fn test_descriptor_idempotent() {
        let field = FieldSpec::scalar(WireKind::String, 1);
        field.bind("email", "pkg.v1").unwrap();

        let first = field.descriptor().unwrap();
        let second = field.descriptor().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_context() {
        let field = FieldSpec::scalar(WireKind::Int64, 3);
        assert!(matches!(
            field.name(),
            Err(FieldError::MissingContext { accessor: "name" })
        ));
        assert!(matches!(
            field.package(),
            Err(FieldError::MissingContext { accessor: "package" })
        ));
        assert!(matches!(
            field.descriptor(),
            Err(FieldError::MissingContext { accessor: "descriptor" })
        ));
    }

    #[test]
    fn test_bind_exactly_once() {
        let field = FieldSpec::scalar(WireKind::Bool, 4);
        field.bind("active", "pkg.v1").unwrap();
        assert_eq!(field.name().unwrap(), "active");
        assert_eq!(field.package().unwrap(), "pkg.v1");

        let rebound = field.bind("other", "pkg.v2");
        assert!(matches!(rebound, Err(FieldError::AlreadyBound { .. })));
        assert_eq!(field.name().unwrap(), "active");
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn test_zero_field_number_panics() {
        FieldSpec::scalar(WireKind::Int32, 0);
    }

    #[test]
    fn test_relative_name_qualified_once() {
        let field = FieldSpec::message_named("Profile", 2);
        field.bind("profile", "pkg.v1").unwrap();
        assert_eq!(field.message_type_name().unwrap(), "Profile");

        let descriptor = field.descriptor().unwrap();
        assert_eq!(descriptor.type_name.as_deref(), Some("pkg.v1.Profile"));
        assert_eq!(field.message_type_name().unwrap(), "pkg.v1.Profile");

        // A second resolution must not re-qualify.
        let again = field.descriptor().unwrap();
        assert_eq!(again.type_name.as_deref(), Some("pkg.v1.Profile"));
        assert_eq!(field.message_type_name().unwrap(), "pkg.v1.Profile");
    }

    #[test]
    fn test_qualified_name_untouched() {
        let field = FieldSpec::message_named("pkg.v1.Profile", 2);
        field.bind("profile", "pkg.v1").unwrap();
        field.descriptor().unwrap();
        assert_eq!(field.message_type_name().unwrap(), "pkg.v1.Profile");
    }

    #[test]
    fn test_message_object_resolution() {
        let ty: Arc<dyn MessageType> = Arc::new(RawMessage {
            full_name: "pkg.v1.Profile",
        });
        let field = FieldSpec::message(ty, 2);
        field.bind("profile", "pkg.v1").unwrap();

        assert_eq!(field.kind(), WireKind::Message);
        let descriptor = field.descriptor().unwrap();
        assert_eq!(descriptor.kind, WireKind::Message);
        assert_eq!(descriptor.type_name.as_deref(), Some("pkg.v1.Profile"));
    }

    #[test]
    fn test_meta_fallback_resolution() {
        let field = FieldSpec::message(Arc::new(MetaOnlyMessage), 7);
        field.bind("meta", "pkg.v1").unwrap();
        let descriptor = field.descriptor().unwrap();
        assert_eq!(descriptor.type_name.as_deref(), Some("pkg.v1.MetaOnly"));
    }

    #[test]
    fn test_unresolvable_reference() {
        let field = FieldSpec::message(Arc::new(OpaqueMessage), 8);
        field.bind("opaque", "pkg.v1").unwrap();
        let result = field.descriptor();
        assert!(matches!(
            result,
            Err(FieldError::UnresolvableReference { field }) if field == "opaque"
        ));
    }

    #[test]
    fn test_enum_resolves_as_int32() {
        let field = FieldSpec::enumeration(Arc::new(Color), 5);
        field.bind("color", "pkg.v1").unwrap();

        assert_eq!(field.kind(), WireKind::Enum);
        let descriptor = field.descriptor().unwrap();
        assert_eq!(descriptor.kind, WireKind::Int32);
        assert!(descriptor.type_name.is_none());
    }

    #[test]
    fn test_pb_type_enum() {
        let field = FieldSpec::enumeration(Arc::new(Color), 5);
        match field.pb_type() {
            Some(PbType::Enum(en)) => assert_eq!(en.full_name(), "pkg.v1.Color"),
            other => panic!("expected enum pb_type, got {:?}", other),
        }
    }

    #[test]
    fn test_pb_type_scalar_and_named() {
        assert!(FieldSpec::scalar(WireKind::String, 1).pb_type().is_none());
        assert!(FieldSpec::message_named("Profile", 2).pb_type().is_none());
    }

    #[test]
    fn test_pb_type_unwraps_declarative_wrapper() {
        #[derive(Debug)]
        struct Wrapper;

        impl MessageType for Wrapper {
            fn meta_full_name(&self) -> Option<String> {
                Some("pkg.v1.Wrapped".to_string())
            }

            fn runtime_type(&self) -> Option<Arc<dyn MessageType>> {
                Some(Arc::new(RawMessage {
                    full_name: "pkg.v1.Wrapped",
                }))
            }
        }

        let field = FieldSpec::message(Arc::new(Wrapper), 9);
        match field.pb_type() {
            Some(PbType::Message(ty)) => {
                assert_eq!(ty.descriptor_full_name().as_deref(), Some("pkg.v1.Wrapped"));
            }
            other => panic!("expected message pb_type, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_cardinality() {
        let field = RepeatedField::scalar(WireKind::Int32, 6);
        field.bind("scores", "pkg.v1").unwrap();
        assert!(field.is_repeated());
        assert_eq!(field.descriptor().unwrap().label, Label::Repeated);

        let singular = FieldSpec::scalar(WireKind::Int32, 6);
        singular.bind("score", "pkg.v1").unwrap();
        assert_eq!(singular.descriptor().unwrap().label, Label::Optional);
    }

    #[test]
    fn test_map_records_key_kind() {
        let field = MapField::message_named(WireKind::String, "Profile", 3);
        field.bind("profiles", "pkg.v1").unwrap();

        assert_eq!(field.map_key(), Some(WireKind::String));
        let descriptor = field.descriptor().unwrap();
        assert_eq!(descriptor.label, Label::Repeated);
        assert_eq!(descriptor.type_name.as_deref(), Some("pkg.v1.Profile"));
    }

    #[test]
    fn test_attribute_setters() {
        let field = FieldSpec::scalar(WireKind::String, 1)
            .with_json_name("userName")
            .with_oneof("contact")
            .with_optional(true);
        field.bind("email", "pkg.v1").unwrap();

        assert_eq!(field.oneof(), Some("contact"));
        let descriptor = field.descriptor().unwrap();
        assert_eq!(descriptor.json_name.as_deref(), Some("userName"));
        assert!(descriptor.proto3_optional);
    }
}

//! Protofield
//!
//! Field descriptor metadata for versioned, wire-format message schemas.
//! Models the declared shape of a single message field and lazily resolves
//! it into the canonical descriptor record a schema compiler consumes.
//!
//! ## Features
//!
//! - **Deferred resolution**: fields may reference message types that do not
//!   exist yet (forward, self, and cross-file references); linked type names
//!   are resolved at first descriptor access, not at declaration
//! - **Resolve-once caching**: the descriptor is computed at most once per
//!   field and is immutable thereafter
//! - **Two-phase construction**: fields are declared before they know which
//!   message owns them; the owning message binds name and package later
//! - **Repeated and map variants**: sequence and map fields reuse the same
//!   construction and resolution machinery
//!
//! ## Lifecycle
//!
//! ```text
//! declare            bind                    resolve
//! FieldSpec::scalar  field.bind(name, pkg)   field.descriptor()
//! ::message          exactly once, by the    lazy, cached, emits
//! ::message_named    owning message's        {name, number, label,
//! ::enumeration      assembly pass           type, type_name, ...}
//! ```
//!
//! Message assembly, enum type representation, and byte-level encoding live
//! in external collaborators; this crate only builds descriptors.

pub mod descriptor;
pub mod error;
pub mod field;
pub mod reference;
pub mod wire;

pub use descriptor::FieldDescriptor;
pub use error::{FieldError, Result};
pub use field::{FieldSpec, MapField, RepeatedField};
pub use reference::{EnumType, MessageRef, MessageType, PbType};
pub use wire::{Label, WireKind};

//! Error types for field descriptor construction

use thiserror::Error;

/// Result type for field descriptor operations
pub type Result<T> = std::result::Result<T, FieldError>;

/// Field descriptor errors
///
/// All of these are structural authoring mistakes detected at schema-build
/// time; none are transient, so there is no retry path.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("field context not bound: {accessor} requires bind(name, package) first")]
    MissingContext { accessor: &'static str },

    #[error("field already bound as {name} in package {package}")]
    AlreadyBound { name: String, package: String },

    #[error("message reference on field {field} exposes no full name")]
    UnresolvableReference { field: String },
}

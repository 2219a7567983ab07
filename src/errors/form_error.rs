//! Form construction error types
//!
//! Construction errors never escape the builder's convenience API
//! (`add_field`, `set_field`, ...); they are logged and turned into
//! `None`/`false`. The `try_*` twins hand them to the caller instead.

use thiserror::Error;

/// Errors raised while building fields and forms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// A field with this name already exists in the builder
    #[error("Field with name '{0}' already exists")]
    DuplicateName(String),

    /// The field name is empty
    #[error("Field name must not be empty")]
    EmptyName,

    /// The question prompt is empty
    #[error("Field '{0}' has an empty question")]
    EmptyQuestion(String),

    /// The field type tag is not one of the known variants
    #[error("Field '{name}' has invalid type '{type_name}'")]
    UnknownFieldType { name: String, type_name: String },

    /// The validation payload does not fit the field variant
    #[error("Field '{name}' has invalid validation: {reason}")]
    InvalidValidation { name: String, reason: String },

    /// A behavior could not be attached
    #[error("Invalid behavior for field '{name}': {reason}")]
    InvalidBehavior { name: String, reason: String },

    /// The form document could not be parsed
    #[error("Failed to parse form definition: {0}")]
    Parse(String),
}

/// Result type for form construction
pub type FormResult<T> = Result<T, FormError>;

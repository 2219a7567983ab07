//! # Form definition model
//!
//! Typed description of a voice-driven form: an ordered list of [`Field`]s,
//! each with a variant-specific validation payload and an event → behavior
//! map the server uses for branching.
//!
//! ```rust
//! use veform::form::{Behavior, EventKind, FieldSpec, FieldType, FormBuilder};
//!
//! let mut builder = FormBuilder::new();
//! builder.add_field(FieldSpec::of_type("name", "What is your name?", FieldType::Text));
//! builder.add_field(
//!     FieldSpec::of_type("newsletter", "Want our newsletter?", FieldType::YesNo)
//!         .with_behavior(EventKind::ValidNoAnswer, Behavior::move_to("bye")),
//! );
//! builder.add_field(FieldSpec::of_type("bye", "Thanks for your time!", FieldType::Info));
//!
//! assert_eq!(builder.len(), 3);
//! assert!(builder.dangling_move_targets().is_empty());
//! ```

mod behavior;
mod builder;
mod field;
mod validation;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{FormError, FormResult};

pub use behavior::{Behavior, BehaviorKind, EventConfig, EventKind};
pub use builder::FormBuilder;
pub use field::{
    Field, FieldBase, FieldSpec, FieldType, InfoField, MultiselectField, NumberField,
    SelectField, TextAreaField, TextField, YesNoField,
};
pub use validation::{
    NumberValidation, SelectOption, SelectValidation, TextAreaValidation, TextPattern,
    TextValidation, YesNoValidation,
};

/// Immutable ordered field list; order is the default traversal order
///
/// Serializes to the `{fields: [...]}` payload of the `form` handshake message.
///
/// A `Form` only comes out of a [`FormBuilder`] or one of the checked
/// conversions, so field names are unique and every field passed the
/// construction rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Form {
    fields: Vec<Field>,
}

impl Form {
    pub(crate) fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<Field>> for Form {
    type Error = FormError;

    /// Fails on the first duplicate name or malformed field
    fn try_from(fields: Vec<Field>) -> FormResult<Self> {
        let mut builder = FormBuilder::new();
        for field in fields {
            builder.try_push_field(field)?;
        }
        Ok(builder.snapshot())
    }
}

impl<'de> Deserialize<'de> for Form {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct FormFields {
            fields: Vec<Field>,
        }

        let raw = FormFields::deserialize(deserializer)?;
        Form::try_from(raw.fields).map_err(serde::de::Error::custom)
    }
}

impl From<&FormBuilder> for Form {
    fn from(builder: &FormBuilder) -> Self {
        builder.snapshot()
    }
}

impl From<FormBuilder> for Form {
    fn from(builder: FormBuilder) -> Self {
        builder.snapshot()
    }
}

//! Per-variant validation payloads
//!
//! Each field variant owns its own validation type. Unknown keys are
//! rejected on deserialization so a payload written for one variant cannot
//! be attached to another.

use serde::{Deserialize, Serialize};

use super::behavior::Behavior;

/// Recognized answer patterns for text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPattern {
    Email,
    Phone,
    Url,
    Date,
    Name,
}

/// Validation for [`super::TextField`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<TextPattern>,
    /// Read the captured answer back to the user
    #[serde(default)]
    pub readback: bool,
}

/// Validation for [`super::TextAreaField`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextAreaValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_characters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_characters: Option<u32>,
}

impl TextAreaValidation {
    pub(crate) fn check(&self) -> Result<(), String> {
        match (self.min_characters, self.max_characters) {
            (Some(min), Some(max)) if min > max => Err(format!(
                "minCharacters ({min}) is greater than maxCharacters ({max})"
            )),
            _ => Ok(()),
        }
    }
}

/// One choice of a select or multiselect field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    /// Read this option aloud when prompting
    #[serde(default)]
    pub read_aloud: bool,
    /// Behaviors applied when this option is chosen
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<Behavior>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            read_aloud: false,
            behaviors: Vec::new(),
        }
    }

    pub fn read_aloud(mut self, read_aloud: bool) -> Self {
        self.read_aloud = read_aloud;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }
}

/// Validation for select and multiselect fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectValidation {
    #[serde(default)]
    pub select_options: Vec<SelectOption>,
}

/// Validation for [`super::NumberField`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl NumberValidation {
    pub(crate) fn check(&self) -> Result<(), String> {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) if min > max => Err(format!(
                "minValue ({min}) is greater than maxValue ({max})"
            )),
            _ => Ok(()),
        }
    }
}

/// Validation for [`super::YesNoField`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct YesNoValidation {
    #[serde(default)]
    pub require_yes: bool,
    #[serde(default)]
    pub require_no: bool,
}

//! Field variants
//!
//! `Field` is a closed sum type; every variant is its own struct carrying the
//! shared name/question/event map plus the validation payload that makes
//! sense for it.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::behavior::{Behavior, EventConfig, EventKind};
use super::validation::{
    NumberValidation, SelectOption, SelectValidation, TextAreaValidation, TextValidation,
    YesNoValidation,
};
use crate::errors::{FormError, FormResult};

/// Closed set of field type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "textarea")]
    TextArea,
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "multiselect")]
    Multiselect,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "yesNo")]
    YesNo,
    #[serde(rename = "info")]
    Info,
}

impl FieldType {
    /// Wire tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::TextArea => "textarea",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Number => "number",
            FieldType::YesNo => "yesNo",
            FieldType::Info => "info",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(FieldType::Text),
            "textarea" => Ok(FieldType::TextArea),
            "select" => Ok(FieldType::Select),
            "multiselect" => Ok(FieldType::Multiselect),
            "number" => Ok(FieldType::Number),
            "yesNo" => Ok(FieldType::YesNo),
            "info" => Ok(FieldType::Info),
            other => Err(other.to_string()),
        }
    }
}

/// Attributes shared by every variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBase {
    pub name: String,
    pub question: String,
    #[serde(default)]
    pub event_config: EventConfig,
}

macro_rules! field_variant {
    ($(#[$meta:meta])* $name:ident, $validation:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(flatten)]
            pub base: FieldBase,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            validation: Option<$validation>,
        }

        impl $name {
            pub fn new(name: impl Into<String>, question: impl Into<String>) -> Self {
                Self {
                    base: FieldBase {
                        name: name.into(),
                        question: question.into(),
                        event_config: EventConfig::new(),
                    },
                    validation: None,
                }
            }

            pub fn validation(&self) -> Option<&$validation> {
                self.validation.as_ref()
            }
        }
    };
}

field_variant!(
    /// Free text answer, optionally matched against a pattern
    TextField,
    TextValidation
);
field_variant!(
    /// Long-form text answer
    TextAreaField,
    TextAreaValidation
);
field_variant!(
    /// Single choice among options
    SelectField,
    SelectValidation
);
field_variant!(
    /// Multiple choices among options
    MultiselectField,
    SelectValidation
);
field_variant!(
    /// Numeric answer
    NumberField,
    NumberValidation
);
field_variant!(
    /// Yes/no answer
    YesNoField,
    YesNoValidation
);

impl TextField {
    /// Replace any prior validation
    pub fn add_validation(&mut self, rules: TextValidation) -> bool {
        self.validation = Some(rules);
        true
    }
}

impl TextAreaField {
    /// Replace any prior validation; inverted bounds are refused
    pub fn add_validation(&mut self, rules: TextAreaValidation) -> bool {
        if let Err(reason) = rules.check() {
            tracing::warn!("Field {}: {}", self.base.name, reason);
            return false;
        }
        self.validation = Some(rules);
        true
    }
}

impl NumberField {
    /// Replace any prior validation; inverted bounds are refused
    pub fn add_validation(&mut self, rules: NumberValidation) -> bool {
        if let Err(reason) = rules.check() {
            tracing::warn!("Field {}: {}", self.base.name, reason);
            return false;
        }
        self.validation = Some(rules);
        true
    }
}

impl YesNoField {
    /// Replace any prior validation
    pub fn add_validation(&mut self, rules: YesNoValidation) -> bool {
        self.validation = Some(rules);
        true
    }
}

impl SelectField {
    /// Replace any prior validation; options with malformed behaviors are refused
    pub fn add_validation(&mut self, rules: SelectValidation) -> bool {
        if let Err(e) = check_option_behaviors(&self.base.name, &rules.select_options) {
            tracing::warn!("{}", e);
            return false;
        }
        self.validation = Some(rules);
        true
    }

    /// Append an option; returns false when one of its behaviors is malformed
    pub fn add_select_option(&mut self, option: SelectOption) -> bool {
        if let Err(e) = check_option_behaviors(&self.base.name, std::slice::from_ref(&option)) {
            tracing::warn!("{}", e);
            return false;
        }
        self.validation
            .get_or_insert_with(SelectValidation::default)
            .select_options
            .push(option);
        true
    }

    pub fn select_options(&self) -> &[SelectOption] {
        self.validation
            .as_ref()
            .map(|v| v.select_options.as_slice())
            .unwrap_or(&[])
    }
}

impl MultiselectField {
    /// Replace any prior validation; options with malformed behaviors are refused
    pub fn add_validation(&mut self, rules: SelectValidation) -> bool {
        if let Err(e) = check_option_behaviors(&self.base.name, &rules.select_options) {
            tracing::warn!("{}", e);
            return false;
        }
        self.validation = Some(rules);
        true
    }

    /// Append an option; returns false when one of its behaviors is malformed
    pub fn add_select_option(&mut self, option: SelectOption) -> bool {
        if let Err(e) = check_option_behaviors(&self.base.name, std::slice::from_ref(&option)) {
            tracing::warn!("{}", e);
            return false;
        }
        self.validation
            .get_or_insert_with(SelectValidation::default)
            .select_options
            .push(option);
        true
    }

    pub fn select_options(&self) -> &[SelectOption] {
        self.validation
            .as_ref()
            .map(|v| v.select_options.as_slice())
            .unwrap_or(&[])
    }
}

/// Presentation-only field; no answer is captured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoField {
    #[serde(flatten)]
    pub base: FieldBase,
}

impl InfoField {
    pub fn new(name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            base: FieldBase {
                name: name.into(),
                question: question.into(),
                event_config: EventConfig::new(),
            },
        }
    }
}

/// One question unit of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Field {
    #[serde(rename = "text")]
    Text(TextField),
    #[serde(rename = "textarea")]
    TextArea(TextAreaField),
    #[serde(rename = "select")]
    Select(SelectField),
    #[serde(rename = "multiselect")]
    Multiselect(MultiselectField),
    #[serde(rename = "number")]
    Number(NumberField),
    #[serde(rename = "yesNo")]
    YesNo(YesNoField),
    #[serde(rename = "info")]
    Info(InfoField),
}

impl Field {
    /// Build the concrete variant described by `spec`
    pub fn from_spec(spec: FieldSpec) -> FormResult<Field> {
        let FieldSpec {
            name,
            question,
            field_type,
            validation,
            event_config,
        } = spec;

        if name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        if question.trim().is_empty() {
            return Err(FormError::EmptyQuestion(name));
        }
        let kind = FieldType::from_str(&field_type).map_err(|type_name| {
            FormError::UnknownFieldType {
                name: name.clone(),
                type_name,
            }
        })?;
        let event_config = event_config
            .normalized()
            .map_err(|reason| FormError::InvalidBehavior {
                name: name.clone(),
                reason: reason.to_string(),
            })?;
        let validation = validation.filter(|v| !v.is_null());

        let base = FieldBase {
            name,
            question,
            event_config,
        };

        let field = match kind {
            FieldType::Text => Field::Text(TextField {
                validation: parse_validation(&base.name, validation)?,
                base,
            }),
            FieldType::TextArea => {
                let rules: Option<TextAreaValidation> = parse_validation(&base.name, validation)?;
                if let Some(Err(reason)) = rules.as_ref().map(TextAreaValidation::check) {
                    return Err(FormError::InvalidValidation {
                        name: base.name,
                        reason,
                    });
                }
                Field::TextArea(TextAreaField {
                    validation: rules,
                    base,
                })
            }
            FieldType::Select => Field::Select(SelectField {
                validation: parse_validation(&base.name, validation)?,
                base,
            }),
            FieldType::Multiselect => Field::Multiselect(MultiselectField {
                validation: parse_validation(&base.name, validation)?,
                base,
            }),
            FieldType::Number => {
                let rules: Option<NumberValidation> = parse_validation(&base.name, validation)?;
                if let Some(Err(reason)) = rules.as_ref().map(NumberValidation::check) {
                    return Err(FormError::InvalidValidation {
                        name: base.name,
                        reason,
                    });
                }
                Field::Number(NumberField {
                    validation: rules,
                    base,
                })
            }
            FieldType::YesNo => Field::YesNo(YesNoField {
                validation: parse_validation(&base.name, validation)?,
                base,
            }),
            FieldType::Info => {
                if validation.is_some() {
                    return Err(FormError::InvalidValidation {
                        name: base.name,
                        reason: "info fields take no validation".to_string(),
                    });
                }
                Field::Info(InfoField { base })
            }
        };

        check_option_behaviors(field.name(), field.select_options())?;
        Ok(field)
    }

    /// Re-check a field built outside the builder, e.g. deserialized
    ///
    /// Applies the same rules as [`Field::from_spec`]; the event map is
    /// normalized so at most one MoveTo remains per event.
    pub(crate) fn validated(mut self) -> FormResult<Field> {
        let name = self.name().to_string();
        if name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        if self.question().trim().is_empty() {
            return Err(FormError::EmptyQuestion(name));
        }

        let base = self.base_mut();
        base.event_config = std::mem::take(&mut base.event_config)
            .normalized()
            .map_err(|reason| FormError::InvalidBehavior {
                name: name.clone(),
                reason: reason.to_string(),
            })?;

        let range = match &self {
            Field::TextArea(f) => f.validation().map(TextAreaValidation::check),
            Field::Number(f) => f.validation().map(NumberValidation::check),
            _ => None,
        };
        if let Some(Err(reason)) = range {
            return Err(FormError::InvalidValidation { name, reason });
        }

        check_option_behaviors(&name, self.select_options())?;
        Ok(self)
    }

    pub fn base(&self) -> &FieldBase {
        match self {
            Field::Text(f) => &f.base,
            Field::TextArea(f) => &f.base,
            Field::Select(f) => &f.base,
            Field::Multiselect(f) => &f.base,
            Field::Number(f) => &f.base,
            Field::YesNo(f) => &f.base,
            Field::Info(f) => &f.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut FieldBase {
        match self {
            Field::Text(f) => &mut f.base,
            Field::TextArea(f) => &mut f.base,
            Field::Select(f) => &mut f.base,
            Field::Multiselect(f) => &mut f.base,
            Field::Number(f) => &mut f.base,
            Field::YesNo(f) => &mut f.base,
            Field::Info(f) => &mut f.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn question(&self) -> &str {
        &self.base().question
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Text(_) => FieldType::Text,
            Field::TextArea(_) => FieldType::TextArea,
            Field::Select(_) => FieldType::Select,
            Field::Multiselect(_) => FieldType::Multiselect,
            Field::Number(_) => FieldType::Number,
            Field::YesNo(_) => FieldType::YesNo,
            Field::Info(_) => FieldType::Info,
        }
    }

    pub fn event_config(&self) -> &EventConfig {
        &self.base().event_config
    }

    /// Attach a behavior to `event`; a MoveTo replaces any existing MoveTo
    pub fn add_behavior(&mut self, event: EventKind, behavior: Behavior) -> bool {
        let name = self.name().to_string();
        if let Some(reason) = behavior.problem() {
            tracing::warn!("Refusing behavior on field {}: {}", name, reason);
            return false;
        }
        self.base_mut().event_config.add(event, behavior)
    }

    pub fn behaviors(&self, event: EventKind) -> &[Behavior] {
        self.event_config().behaviors(event)
    }

    /// Options of a select or multiselect field; empty for other variants
    pub fn select_options(&self) -> &[SelectOption] {
        match self {
            Field::Select(f) => f.select_options(),
            Field::Multiselect(f) => f.select_options(),
            _ => &[],
        }
    }

    /// Every MoveTo target named by this field's behaviors and options
    pub fn move_targets(&self) -> Vec<&str> {
        let from_events = self
            .event_config()
            .iter()
            .flat_map(|(_, behaviors)| behaviors.iter());
        let from_options = self
            .select_options()
            .iter()
            .flat_map(|option| option.behaviors.iter());

        from_events
            .chain(from_options)
            .filter_map(Behavior::move_target)
            .collect()
    }
}

/// Every option behavior must be well formed, e.g. a MoveTo needs a target
fn check_option_behaviors(name: &str, options: &[SelectOption]) -> FormResult<()> {
    for option in options {
        if let Some(reason) = option.behaviors.iter().find_map(Behavior::problem) {
            return Err(FormError::InvalidBehavior {
                name: name.to_string(),
                reason: format!("option '{}': {}", option.value, reason),
            });
        }
    }
    Ok(())
}

fn parse_validation<T: DeserializeOwned>(name: &str, value: Option<Value>) -> FormResult<Option<T>> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| FormError::InvalidValidation {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

/// Untyped field description accepted by the builder
///
/// `field_type` stays a raw string so unknown tags coming from documents are
/// rejected by the builder instead of failing somewhere upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub question: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Value>,
    #[serde(default)]
    pub event_config: EventConfig,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        question: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            question: question.into(),
            field_type: field_type.into(),
            validation: None,
            event_config: EventConfig::new(),
        }
    }

    /// Typed shorthand for [`FieldSpec::new`]
    pub fn of_type(name: impl Into<String>, question: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, question, field_type.as_str())
    }

    /// Attach a validation payload; anything serializable to the variant's JSON shape
    ///
    /// A payload that fails to serialize is logged and leaves the spec
    /// without validation.
    pub fn with_validation(mut self, validation: impl Serialize) -> Self {
        match serde_json::to_value(validation) {
            Ok(value) => self.validation = Some(value),
            Err(e) => {
                tracing::warn!("Dropping validation for field {}: {}", self.name, e);
                self.validation = None;
            }
        }
        self
    }

    pub fn with_behavior(mut self, event: EventKind, behavior: Behavior) -> Self {
        self.event_config.add(event, behavior);
        self
    }
}

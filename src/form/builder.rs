//! Ordered, name-unique field collection

use std::path::Path;

use tracing::{debug, error};

use super::field::{Field, FieldSpec};
use super::Form;
use crate::errors::{FormError, FormResult};

/// Incrementally builds the ordered field list handed to a session
///
/// Lookups are linear; forms hold tens of fields at most.
#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    fields: Vec<Field>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct the field described by `spec` and append it
    ///
    /// Returns `None` without touching the collection when the name is taken,
    /// the name or question is empty, or the type is unknown.
    pub fn add_field(&mut self, spec: FieldSpec) -> Option<&Field> {
        match self.try_add_field(spec) {
            Ok(field) => Some(field),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Same as [`FormBuilder::add_field`] but reports why construction failed
    pub fn try_add_field(&mut self, spec: FieldSpec) -> FormResult<&Field> {
        if self.position(&spec.name).is_some() {
            return Err(FormError::DuplicateName(spec.name));
        }

        let field = Field::from_spec(spec)?;
        debug!("Adding {} field '{}'", field.field_type(), field.name());
        self.fields.push(field);

        Ok(&self.fields[self.fields.len() - 1])
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name() == name)
    }

    /// Append an already constructed field, e.g. one deserialized elsewhere
    ///
    /// The field goes through the same checks as [`FormBuilder::try_add_field`].
    pub fn try_push_field(&mut self, field: Field) -> FormResult<&Field> {
        if self.position(field.name()).is_some() {
            return Err(FormError::DuplicateName(field.name().to_string()));
        }

        let field = field.validated()?;
        debug!("Adding {} field '{}'", field.field_type(), field.name());
        self.fields.push(field);

        Ok(&self.fields[self.fields.len() - 1])
    }

    /// Replace the field stored under `name`, keeping its position
    ///
    /// The replacement may carry a different name as long as it does not
    /// collide with another field, and must pass the construction checks.
    pub fn set_field(&mut self, name: &str, field: Field) -> bool {
        let Some(index) = self.position(name) else {
            debug!("set_field: no field named '{}'", name);
            return false;
        };

        if field.name() != name && self.position(field.name()).is_some() {
            error!("{}", FormError::DuplicateName(field.name().to_string()));
            return false;
        }
        let field = match field.validated() {
            Ok(field) => field,
            Err(e) => {
                error!("set_field: replacement for '{}' rejected: {}", name, e);
                return false;
            }
        };

        self.fields[index] = field;
        true
    }

    /// Remove by name, shifting later fields left
    pub fn remove_field(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.fields.remove(index);
                true
            }
            None => false,
        }
    }

    /// Full ordered collection; the builder stays the owner
    pub fn get_fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Immutable copy suitable for handing to a session
    pub fn snapshot(&self) -> Form {
        Form::new(self.fields.clone())
    }

    /// MoveTo behaviors whose target names no field: `(field, target)` pairs
    pub fn dangling_move_targets(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flat_map(|field| {
                field
                    .move_targets()
                    .into_iter()
                    .filter(|target| self.get_field(target).is_none())
                    .map(|target| (field.name().to_string(), target.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Build from a list of field specs; the first rejected spec aborts
    pub fn from_specs(specs: impl IntoIterator<Item = FieldSpec>) -> FormResult<Self> {
        let mut builder = Self::new();
        for spec in specs {
            builder.try_add_field(spec)?;
        }
        Ok(builder)
    }

    /// Parse a JSON document: either a list of specs or `{"fields": [...]}`
    pub fn from_json(text: &str) -> FormResult<Self> {
        let document: FormDocument =
            serde_json::from_str(text).map_err(|e| FormError::Parse(e.to_string()))?;
        Self::from_specs(document.into_specs())
    }

    /// Parse a YAML document with the same shape as [`FormBuilder::from_json`]
    pub fn from_yaml(text: &str) -> FormResult<Self> {
        let document: FormDocument =
            serde_yaml::from_str(text).map_err(|e| FormError::Parse(e.to_string()))?;
        Self::from_specs(document.into_specs())
    }

    /// Load a form file, picking the parser from the extension (`.yaml`/`.yml` or JSON)
    pub fn from_file(path: &Path) -> FormResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FormError::Parse(format!("Failed to read form file {}: {e}", path.display()))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FormDocument {
    Wrapped { fields: Vec<FieldSpec> },
    List(Vec<FieldSpec>),
}

impl FormDocument {
    fn into_specs(self) -> Vec<FieldSpec> {
        match self {
            FormDocument::Wrapped { fields } => fields,
            FormDocument::List(fields) => fields,
        }
    }
}

//! Schema-level form handling
//!
//! `SchemaForm` holds one field strategy per declared field and applies
//! submissions to entities. Only declared fields are ever written, and a
//! submission with any invalid value leaves the entity untouched.

use crate::field::Field;
use crate::input::InputSpec;
use crate::lookup::EntityLookup;
use crate::normalize;
use crate::registry::FieldTypeRegistry;
use brawo_core::{CmsError, CmsResult, FieldError, ValidationErrors};
use brawo_schema::{is_blank, ContentTypeSchema, DynamicEntity};
use serde::Serialize;
use serde_json::{Map, Value};

/// Message of a missing required value
pub const BLANK_MESSAGE: &str = "can't be blank";

/// One label/value pair of an entity's detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub name: String,
    pub label: String,
    pub value: String,
}

/// Field strategies of one content type
#[derive(Debug, Clone)]
pub struct SchemaForm {
    content_type: String,
    fields: Vec<Field>,
}

impl SchemaForm {
    pub fn build(schema: &ContentTypeSchema, registry: &FieldTypeRegistry) -> Self {
        Self {
            content_type: schema.slug.clone(),
            fields: registry.build_all(schema.fields()),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Keep only submitted values of declared fields
    ///
    /// Multi-value controls submit under `name[]`; both spellings are accepted.
    pub fn permit(&self, params: &Map<String, Value>) -> Map<String, Value> {
        let mut permitted = Map::new();

        for (key, value) in params {
            let name = normalize::param_name(key);
            if self.field(name).is_some() {
                permitted.insert(name.to_string(), value.clone());
            } else {
                tracing::debug!(
                    content_type = %self.content_type,
                    param = %key,
                    "ignoring undeclared parameter"
                );
            }
        }

        permitted
    }

    /// Normalize the permitted part of a submission
    pub fn validate(&self, params: &Map<String, Value>) -> Result<Map<String, Value>, ValidationErrors> {
        let permitted = self.permit(params);
        let mut normalized = Map::new();
        let mut errors = ValidationErrors::new();

        for field in &self.fields {
            let Some(raw) = permitted.get(field.name()) else {
                continue;
            };
            match field.validate(raw) {
                Ok(value) => {
                    normalized.insert(field.name().to_string(), value);
                }
                Err(field_errors) => errors.extend(field_errors.errors),
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }

    /// Validate a submission and write it to the entity
    pub fn apply(&self, entity: &mut DynamicEntity, params: &Map<String, Value>) -> CmsResult<()> {
        let normalized = self.validate(params).map_err(CmsError::Invalid)?;

        tracing::debug!(
            content_type = %self.content_type,
            fields = normalized.len(),
            "submission applied"
        );

        for (name, value) in normalized {
            entity.set_field(name, value);
        }
        Ok(())
    }

    /// Required fields without a value
    pub fn missing_required(&self, entity: &DynamicEntity) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_required() && is_blank(&f.get_value(entity)))
            .map(|f| f.name())
            .collect()
    }

    /// Check that every required field has a value
    pub fn check_publishable(&self, entity: &DynamicEntity) -> CmsResult<()> {
        let mut errors = ValidationErrors::new();
        for name in self.missing_required(entity) {
            errors.push(FieldError::new(name, BLANK_MESSAGE));
        }
        errors.into_result()
    }

    /// Input descriptions of every field, in declaration order
    pub fn describe(&self, entity: &DynamicEntity, lookup: &dyn EntityLookup) -> Vec<InputSpec> {
        self.fields
            .iter()
            .map(|f| f.describe_input(&f.get_value(entity), lookup))
            .collect()
    }

    /// Display rows of every field, in declaration order
    pub fn display(&self, entity: &DynamicEntity, lookup: &dyn EntityLookup) -> Vec<DisplayRow> {
        self.fields
            .iter()
            .map(|f| DisplayRow {
                name: f.name().to_string(),
                label: f.label(),
                value: f.format_for_display(entity, lookup),
            })
            .collect()
    }
}

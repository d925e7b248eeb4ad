//! Field definitions for content type schemas
//!
//! A `FieldDefinition` is the immutable descriptor of one declared field:
//! its name, type tag and the options that drive coercion, display, input
//! rendering and storage.

use crate::naming::{humanize, is_valid_identifier};
use brawo_core::{CmsError, CmsResult, FieldType, Named, Validatable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// FieldDefinition
// ============================================================================

/// Descriptor of a single field within a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name (identifier, unique within its schema)
    pub name: String,

    /// Declared type tag
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Display label (falls back to the humanized name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Whether a non-empty value is needed before publishing
    #[serde(default)]
    pub required: bool,

    /// Whether storage enforces uniqueness for this column
    #[serde(default)]
    pub unique: bool,

    /// Value used when a new entity does not supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Ordered choices (select fields)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,

    /// Total digits (decimal fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    /// Fraction digits (decimal fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    /// Slug of the taxonomy schema (taxonomy fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_type: Option<String>,

    /// Slug of the referenced schema (reference and belongs_to fields)
    #[serde(
        default,
        alias = "model_class",
        alias = "class_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_schema: Option<String>,

    /// Nested field list (repeater fields)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldDefinition>,

    /// Help text shown below the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    /// Placeholder text for the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Extra input attributes passed through to the rendered control
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl FieldDefinition {
    /// Create a new field with the given name and type
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            required: false,
            unique: false,
            default: None,
            choices: Vec::new(),
            precision: None,
            scale: None,
            taxonomy_type: None,
            target_schema: None,
            sub_fields: Vec::new(),
            help_text: None,
            placeholder: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a string field
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Create a select field with plain choices (label = value)
    pub fn select<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut field = Self::new(name, FieldType::Select);
        field.choices = choices.into_iter().map(|c| Choice::plain(c)).collect();
        field
    }

    /// Create a taxonomy field pointing at a taxonomy schema
    pub fn taxonomy(name: impl Into<String>, taxonomy_type: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldType::Taxonomy);
        field.taxonomy_type = Some(taxonomy_type.into());
        field
    }

    /// Create a reference field pointing at another schema
    pub fn reference(name: impl Into<String>, target_schema: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldType::Reference);
        field.target_schema = Some(target_schema.into());
        field
    }

    /// Create a repeater field with the given sub-fields
    pub fn repeater(name: impl Into<String>, sub_fields: Vec<FieldDefinition>) -> Self {
        let mut field = Self::new(name, FieldType::Repeater);
        field.sub_fields = sub_fields;
        field
    }

    /// Create a decimal field with precision and scale
    pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> Self {
        let mut field = Self::new(name, FieldType::Decimal);
        field.precision = Some(precision);
        field.scale = Some(scale);
        field
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a default value
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a choice with distinct label and value
    pub fn with_choice(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.push(Choice::new(label, value));
        self
    }

    /// Set the help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help_text = Some(help.into());
        self
    }

    /// Set the placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set an input attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the referenced schema
    pub fn with_target(mut self, target_schema: impl Into<String>) -> Self {
        self.target_schema = Some(target_schema.into());
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Get the display label (falls back to humanized field name)
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| humanize(&self.name))
    }

    /// Look up a sub-field of a repeater by name
    pub fn sub_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.sub_fields.iter().find(|f| f.name == name)
    }

    /// Label shown for a stored choice value, if it is one of the choices
    pub fn choice_label(&self, value: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.label.as_str())
    }

    /// Check if a value is one of the declared choices
    pub fn has_choice(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }
}

impl Named for FieldDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> String {
        self.display_label()
    }
}

impl Validatable for FieldDefinition {
    fn validate(&self) -> CmsResult<()> {
        if self.name.is_empty() {
            return Err(CmsError::validation("Field name cannot be empty"));
        }

        if !is_valid_identifier(&self.name) {
            return Err(CmsError::validation(format!(
                "Field name '{}' is not a valid identifier",
                self.name
            )));
        }

        if let (Some(precision), Some(scale)) = (self.precision, self.scale) {
            if scale > precision {
                return Err(CmsError::validation(format!(
                    "Field '{}' has scale {} greater than precision {}",
                    self.name, scale, precision
                )));
            }
        }

        match self.field_type {
            FieldType::Select if self.choices.is_empty() => {
                return Err(CmsError::validation(format!(
                    "Select field '{}' has no choices",
                    self.name
                )));
            }
            FieldType::Repeater => {
                if self.sub_fields.is_empty() {
                    return Err(CmsError::validation(format!(
                        "Repeater field '{}' has no sub-fields",
                        self.name
                    )));
                }

                let mut seen = HashSet::new();
                for sub in &self.sub_fields {
                    if sub.field_type.is_repeater() {
                        return Err(CmsError::validation(format!(
                            "Repeater field '{}' cannot nest repeater '{}'",
                            self.name, sub.name
                        )));
                    }
                    if !seen.insert(sub.name.as_str()) {
                        return Err(CmsError::validation(format!(
                            "Repeater field '{}' declares sub-field '{}' twice",
                            self.name, sub.name
                        )));
                    }
                    sub.validate()?;
                }
            }
            _ => {}
        }

        if !self.sub_fields.is_empty() && !self.field_type.is_repeater() {
            return Err(CmsError::validation(format!(
                "Only repeater fields may declare sub-fields ('{}' is {})",
                self.name, self.field_type
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Choice
// ============================================================================

/// A (label, value) pair offered by a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChoiceRepr", into = "ChoiceRepr")]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Choice whose label and value are the same text
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            value: text,
        }
    }
}

/// Declarations may list choices as bare strings or as `{ label, value }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ChoiceRepr {
    Plain(String),
    Pair { label: String, value: String },
}

impl From<ChoiceRepr> for Choice {
    fn from(repr: ChoiceRepr) -> Self {
        match repr {
            ChoiceRepr::Plain(text) => Choice::plain(text),
            ChoiceRepr::Pair { label, value } => Choice::new(label, value),
        }
    }
}

impl From<Choice> for ChoiceRepr {
    fn from(choice: Choice) -> Self {
        if choice.label == choice.value {
            ChoiceRepr::Plain(choice.value)
        } else {
            ChoiceRepr::Pair {
                label: choice.label,
                value: choice.value,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_new() {
        let field = FieldDefinition::new("question", "string");
        assert_eq!(field.name, "question");
        assert_eq!(field.field_type, FieldType::String);
        assert!(!field.required);
        assert_eq!(field.display_label(), "Question");
    }

    #[test]
    fn test_field_builder() {
        let field = FieldDefinition::new("display_order", "integer")
            .with_default(0)
            .with_label("Order")
            .with_help("Lower numbers come first")
            .with_attribute("min", "0");

        assert_eq!(field.field_type, FieldType::Integer);
        assert_eq!(field.default, Some(json!(0)));
        assert_eq!(field.display_label(), "Order");
        assert_eq!(field.attributes.get("min"), Some(&"0".to_string()));
    }

    #[test]
    fn test_select_choices() {
        let field = FieldDefinition::select("category", ["General", "Billing"])
            .with_choice("Tech support", "technical");

        assert!(field.has_choice("Billing"));
        assert!(field.has_choice("technical"));
        assert_eq!(field.choice_label("technical"), Some("Tech support"));
        assert_eq!(field.choice_label("Unknown"), None);
    }

    #[test]
    fn test_nested_repeater_is_rejected() {
        let inner = FieldDefinition::repeater("inner", vec![FieldDefinition::string("x")]);
        let outer = FieldDefinition::repeater("outer", vec![inner]);
        let err = outer.validate().unwrap_err();
        assert!(err.to_string().contains("cannot nest repeater"));
    }

    #[test]
    fn test_repeater_duplicate_sub_fields_rejected() {
        let field = FieldDefinition::repeater(
            "features",
            vec![FieldDefinition::string("name"), FieldDefinition::string("name")],
        );
        assert!(field.validate().is_err());
    }

    #[test]
    fn test_field_validation() {
        assert!(FieldDefinition::string("title").validate().is_ok());
        assert!(FieldDefinition::string("").validate().is_err());
        assert!(FieldDefinition::string("has space").validate().is_err());
        assert!(FieldDefinition::new("category", "select").validate().is_err());
        assert!(FieldDefinition::decimal("price", 4, 6).validate().is_err());
        assert!(FieldDefinition::decimal("price", 10, 2).validate().is_ok());
    }

    #[test]
    fn test_unknown_type_is_still_valid() {
        let field = FieldDefinition::new("swatch", "color_picker");
        assert!(field.field_type.is_unknown());
        assert!(field.validate().is_ok());
    }

    #[test]
    fn test_deserialize_declaration() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "name": "category",
            "type": "select",
            "choices": ["General", {"label": "Tech", "value": "technical"}]
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Select);
        assert_eq!(field.choices[0], Choice::plain("General"));
        assert_eq!(field.choices[1], Choice::new("Tech", "technical"));
    }

    #[test]
    fn test_deserialize_model_class_alias() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "name": "vendor_ids",
            "type": "reference",
            "model_class": "products"
        }))
        .unwrap();
        assert_eq!(field.target_schema.as_deref(), Some("products"));
    }

    #[test]
    fn test_missing_type_defaults_to_string() {
        let field: FieldDefinition = serde_json::from_value(json!({ "name": "subtitle" })).unwrap();
        assert_eq!(field.field_type, FieldType::String);
    }
}

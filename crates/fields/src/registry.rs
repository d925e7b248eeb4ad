//! Field kinds and the tag -> kind registry
//!
//! Every declared type tag resolves to one of a closed set of field kinds.
//! Tags that nobody registered resolve to [`FieldKind::String`].

use crate::field::Field;
use brawo_schema::FieldDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// FieldKind
// ============================================================================

/// Behaviour family of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Text,
    Number,
    Boolean,
    Date,
    DateTime,
    Select,
    Taxonomy,
    Reference,
    Repeater,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Select => "select",
            FieldKind::Taxonomy => "taxonomy",
            FieldKind::Reference => "reference",
            FieldKind::Repeater => "repeater",
        }
    }

    pub fn all() -> &'static [FieldKind] {
        &[
            FieldKind::String,
            FieldKind::Text,
            FieldKind::Number,
            FieldKind::Boolean,
            FieldKind::Date,
            FieldKind::DateTime,
            FieldKind::Select,
            FieldKind::Taxonomy,
            FieldKind::Reference,
            FieldKind::Repeater,
        ]
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Built-in tag table
///
/// `text` is multi-line like `textarea`; hosts wanting a single-line `text`
/// can re-register it with `FieldKind::String`.
const BUILTIN_TAGS: &[(&str, FieldKind)] = &[
    ("string", FieldKind::String),
    ("text", FieldKind::Text),
    ("textarea", FieldKind::Text),
    ("rich_text", FieldKind::Text),
    ("number", FieldKind::Number),
    ("integer", FieldKind::Number),
    ("decimal", FieldKind::Number),
    ("boolean", FieldKind::Boolean),
    ("checkbox", FieldKind::Boolean),
    ("date", FieldKind::Date),
    ("datetime", FieldKind::DateTime),
    ("select", FieldKind::Select),
    ("taxonomy", FieldKind::Taxonomy),
    ("reference", FieldKind::Reference),
    ("has_many", FieldKind::Reference),
    ("repeater", FieldKind::Repeater),
];

// ============================================================================
// FieldTypeRegistry
// ============================================================================

/// Maps type tags to field kinds and builds field strategies
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    kinds: HashMap<String, FieldKind>,
}

impl FieldTypeRegistry {
    /// Registry with the built-in tags
    pub fn new() -> Self {
        let kinds = BUILTIN_TAGS
            .iter()
            .map(|(tag, kind)| (tag.to_string(), *kind))
            .collect();
        Self { kinds }
    }

    /// Registry without any tags (everything falls back to string)
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Register (or re-point) a tag, returning the previous kind
    pub fn register(&mut self, tag: impl Into<String>, kind: FieldKind) -> Option<FieldKind> {
        let tag = tag.into().to_ascii_lowercase();
        tracing::debug!(tag = %tag, kind = %kind, "field type registered");
        self.kinds.insert(tag, kind)
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_tag(mut self, tag: impl Into<String>, kind: FieldKind) -> Self {
        self.register(tag, kind);
        self
    }

    /// Check if a tag is registered
    pub fn is_registered(&self, tag: &str) -> bool {
        self.kinds.contains_key(&tag.to_ascii_lowercase())
    }

    /// Kind for a definition's type tag, falling back to string
    pub fn resolve(&self, definition: &FieldDefinition) -> FieldKind {
        let tag = definition.field_type.as_str().to_ascii_lowercase();
        match self.kinds.get(&tag) {
            Some(kind) => *kind,
            None => {
                tracing::debug!(
                    field = %definition.name,
                    tag = %tag,
                    "unknown field type, using string"
                );
                FieldKind::String
            }
        }
    }

    /// Build the strategy for a definition (sub-fields included)
    pub fn build(&self, definition: &FieldDefinition) -> Field {
        let kind = self.resolve(definition);
        let sub_fields = if kind == FieldKind::Repeater {
            definition.sub_fields.iter().map(|sub| self.build(sub)).collect()
        } else {
            Vec::new()
        };
        Field::new(kind, definition.clone(), sub_fields)
    }

    /// Build strategies for every definition, in order
    pub fn build_all<'a>(
        &self,
        definitions: impl IntoIterator<Item = &'a FieldDefinition>,
    ) -> Vec<Field> {
        definitions.into_iter().map(|d| self.build(d)).collect()
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<(&str, FieldKind)> {
        let mut tags: Vec<_> = self.kinds.iter().map(|(t, k)| (t.as_str(), *k)).collect();
        tags.sort_by(|a, b| a.0.cmp(b.0));
        tags
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

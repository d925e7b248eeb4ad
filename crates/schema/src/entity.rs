//! Dynamic entities
//!
//! A `DynamicEntity` is one stored record of a content type. Field values
//! live in a JSON map; the accessor layer resolves each field's definition
//! from the owning schema at call time.

use crate::content_type::ContentTypeSchema;
use brawo_core::{CmsError, CmsResult, ContentStatus, EntityId, FieldError, Timestamped};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// DynamicEntity
// ============================================================================

/// One record of a content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntity {
    /// Storage id (`None` until inserted)
    pub id: Option<EntityId>,

    /// Slug of the owning content type
    pub content_type: String,

    /// URL slug, unique within the content type (empty until generated)
    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub status: ContentStatus,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub author_id: Option<EntityId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Field name -> value
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl DynamicEntity {
    /// Create an unsaved draft of the given content type
    pub fn new(content_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            content_type: content_type.into(),
            slug: String::new(),
            status: ContentStatus::Draft,
            published_at: None,
            author_id: None,
            created_at: now,
            updated_at: now,
            fields: Map::new(),
        }
    }

    /// Create an unsaved draft owned by a schema, with defaults applied
    pub fn for_schema(schema: &ContentTypeSchema) -> Self {
        let mut entity = Self::new(&schema.slug);
        entity.apply_defaults(schema);
        entity
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_author(mut self, author_id: EntityId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    // ========================================================================
    // Raw field map
    // ========================================================================

    /// Raw stored value of a field
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Store a raw value without consulting the schema
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn belongs_to(&self, schema: &ContentTypeSchema) -> bool {
        self.content_type == schema.slug
    }

    // ========================================================================
    // Schema-driven accessors
    // ========================================================================

    /// Read a field through its definition
    ///
    /// Reference fields always come back as an array of ids. Absent values
    /// fall back to the field default, then to null.
    pub fn get(&self, schema: &ContentTypeSchema, name: &str) -> CmsResult<Value> {
        let field = schema.require_field(name)?;

        if field.field_type.is_reference() {
            let ids = reference_ids(self.fields.get(name));
            return Ok(ids_to_value(&ids));
        }

        Ok(self
            .fields
            .get(name)
            .filter(|v| !v.is_null())
            .or(field.default.as_ref())
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Write a field through its definition
    pub fn set(&mut self, schema: &ContentTypeSchema, name: &str, value: Value) -> CmsResult<()> {
        let field = schema.require_field(name)?;

        let value = if field.field_type.is_reference() {
            let ids = try_reference_ids(Some(&value))
                .map_err(|message| CmsError::Invalid(FieldError::new(name, message).into()))?;
            ids_to_value(&ids)
        } else {
            value
        };

        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Reference ids stored in a field (empty for absent or non-reference values)
    pub fn reference_ids(&self, name: &str) -> Vec<EntityId> {
        reference_ids(self.fields.get(name))
    }

    /// Fill absent or null fields with their declared defaults
    pub fn apply_defaults(&mut self, schema: &ContentTypeSchema) {
        for field in schema.fields() {
            let Some(default) = &field.default else {
                continue;
            };
            let absent = self.fields.get(&field.name).map_or(true, Value::is_null);
            if absent {
                self.fields.insert(field.name.clone(), default.clone());
            }
        }
    }

    /// Value of the title-like field, if present and non-blank
    pub fn title(&self, schema: &ContentTypeSchema) -> Option<String> {
        let name = schema.title_field_name()?;
        match self.fields.get(name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Name shown when this entity is referenced elsewhere
    pub fn display_name(&self, schema: &ContentTypeSchema) -> String {
        self.title(schema)
            .or_else(|| (!self.slug.is_empty()).then(|| self.slug.clone()))
            .unwrap_or_else(|| match self.id {
                Some(id) => format!("#{}", id),
                None => "-".to_string(),
            })
    }

    /// Required fields whose value is blank
    pub fn missing_required<'a>(&self, schema: &'a ContentTypeSchema) -> Vec<&'a str> {
        schema
            .required_fields()
            .filter(|field| {
                self.get(schema, &field.name)
                    .map(|v| is_blank(&v))
                    .unwrap_or(true)
            })
            .map(|field| field.name.as_str())
            .collect()
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Published with a publication time that is not in the future
    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
            && self.published_at.is_some_and(|at| at <= Utc::now())
    }

    pub fn is_draft(&self) -> bool {
        self.status == ContentStatus::Draft
    }

    /// Mark as published, keeping an earlier publication time if set
    pub fn mark_published(&mut self, at: DateTime<Utc>) {
        self.status = ContentStatus::Published;
        if self.published_at.is_none() {
            self.published_at = Some(at);
        }
        self.touch();
    }

    pub fn mark_archived(&mut self) {
        self.status = ContentStatus::Archived;
        self.touch();
    }
}

impl Timestamped for DynamicEntity {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Value helpers
// ============================================================================

/// Check if a value counts as empty for required-field purposes
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Parse one reference token into an id
///
/// Returns `Ok(None)` for blank tokens and the error message otherwise.
pub fn parse_reference_id(value: &Value) -> Result<Option<EntityId>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("contains an invalid id '{}'", n)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<EntityId>()
            .map(Some)
            .map_err(|_| format!("contains an invalid id '{}'", s)),
        other => Err(format!("contains an invalid id '{}'", other)),
    }
}

/// Normalize a stored or submitted reference value into ordered unique ids
///
/// Scalars become one-element lists, null/absent becomes empty and blank
/// entries are compacted. Fails on the first token that is not an id.
pub fn try_reference_ids(value: Option<&Value>) -> Result<Vec<EntityId>, String> {
    let tokens: Vec<&Value> = match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };

    let mut ids = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(id) = parse_reference_id(token)? {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// Lenient variant of [`try_reference_ids`] that skips invalid tokens
pub fn reference_ids(value: Option<&Value>) -> Vec<EntityId> {
    let tokens: Vec<&Value> = match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };

    let mut ids = Vec::with_capacity(tokens.len());
    for id in tokens
        .into_iter()
        .filter_map(|t| parse_reference_id(t).ok().flatten())
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// JSON array of ids
pub fn ids_to_value(ids: &[EntityId]) -> Value {
    Value::Array(ids.iter().map(|&id| Value::from(id)).collect())
}

// ============================================================================
// Tests
// ============================================================================

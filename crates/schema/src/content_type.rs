//! Content type schemas
//!
//! A `ContentTypeSchema` is the ordered field list of one content type plus
//! its metadata. Field lookups go through a name index that is rebuilt
//! whenever the schema is constructed or deserialized.

use crate::field::FieldDefinition;
use crate::naming::{humanize, is_valid_slug, pluralize};
use crate::route::{routes_for, Route, RouteDescriptor};
use brawo_core::{CmsError, CmsResult, Named, SchemaKind, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Field names tried, in order, when no title field is declared
pub const TITLE_CANDIDATES: &[&str] = &["title", "name"];

// ============================================================================
// ContentTypeSchema
// ============================================================================

/// Ordered field list and metadata of one content type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SchemaDeclaration", into = "SchemaDeclaration")]
pub struct ContentTypeSchema {
    /// Registry key and URL segment
    pub slug: String,

    /// Human-readable name
    pub display_name: String,

    /// Optional description shown in the admin
    pub description: Option<String>,

    /// Optional icon name shown in the admin
    pub icon: Option<String>,

    /// Content or taxonomy
    pub kind: SchemaKind,

    /// Public routes
    pub routes: RouteDescriptor,

    /// Designated title-like field
    pub title_field: Option<String>,

    fields: Vec<FieldDefinition>,
    field_index: HashMap<String, usize>,
}

impl ContentTypeSchema {
    /// Create an empty content schema
    pub fn new(slug: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            display_name: display_name.into(),
            description: None,
            icon: None,
            kind: SchemaKind::Content,
            routes: RouteDescriptor::default(),
            title_field: None,
            fields: Vec::new(),
            field_index: HashMap::new(),
        }
    }

    /// Create a taxonomy schema with its `name` field
    pub fn taxonomy(slug: impl Into<String>, display_name: impl Into<String>) -> Self {
        let mut schema = Self::new(slug, display_name);
        schema.kind = SchemaKind::Taxonomy;
        schema.with_field(FieldDefinition::string("name").required())
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Append a field
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.push_field(field);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_routes(mut self, routes: RouteDescriptor) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_title_field(mut self, name: impl Into<String>) -> Self {
        self.title_field = Some(name.into());
        self
    }

    /// Append a field, rejecting duplicate names
    pub fn add_field(&mut self, field: FieldDefinition) -> CmsResult<()> {
        if self.field_index.contains_key(&field.name) {
            return Err(CmsError::DuplicateField {
                schema: self.slug.clone(),
                field: field.name,
            });
        }
        self.push_field(field);
        Ok(())
    }

    fn push_field(&mut self, field: FieldDefinition) {
        self.field_index
            .entry(field.name.clone())
            .or_insert(self.fields.len());
        self.fields.push(field);
    }

    fn reindex(&mut self) {
        self.field_index.clear();
        for (idx, field) in self.fields.iter().enumerate() {
            self.field_index.entry(field.name.clone()).or_insert(idx);
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.field_index.get(name).map(|&idx| &self.fields[idx])
    }

    /// Look up a field by name, failing with `FieldNotFound`
    pub fn require_field(&self, name: &str) -> CmsResult<&FieldDefinition> {
        self.field(name).ok_or_else(|| CmsError::FieldNotFound {
            schema: self.slug.clone(),
            field: name.to_string(),
        })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index.contains_key(name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Fields that must be non-empty before publishing
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Name of the title-like field used for slugs and display names
    pub fn title_field_name(&self) -> Option<&str> {
        if let Some(name) = &self.title_field {
            return self.field(name).map(|f| f.name.as_str());
        }

        TITLE_CANDIDATES
            .iter()
            .copied()
            .find(|candidate| self.has_field(candidate))
    }

    pub fn is_taxonomy(&self) -> bool {
        self.kind == SchemaKind::Taxonomy
    }

    /// Table name for the dedicated-table layout
    pub fn table_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, pluralize(&self.slug))
    }

    /// Public routes contributed by this schema
    pub fn route_table(&self) -> Vec<Route> {
        routes_for(&self.slug, &self.routes)
    }

    /// Concrete path of one entity's page
    pub fn single_path(&self, entity_slug: &str) -> Option<String> {
        self.routes.single_path(entity_slug)
    }
}

impl PartialEq for ContentTypeSchema {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
            && self.display_name == other.display_name
            && self.description == other.description
            && self.icon == other.icon
            && self.kind == other.kind
            && self.routes == other.routes
            && self.title_field == other.title_field
            && self.fields == other.fields
    }
}

impl Named for ContentTypeSchema {
    fn name(&self) -> &str {
        &self.slug
    }

    fn label(&self) -> String {
        self.display_name.clone()
    }
}

impl Validatable for ContentTypeSchema {
    fn validate(&self) -> CmsResult<()> {
        if self.slug.is_empty() {
            return Err(CmsError::validation("Content type slug cannot be empty"));
        }

        if !is_valid_slug(&self.slug) {
            return Err(CmsError::schema_validation(
                &self.slug,
                "Slug may only contain lowercase letters, digits, '-' and '_'",
            ));
        }

        if self.display_name.trim().is_empty() {
            return Err(CmsError::schema_validation(
                &self.slug,
                "Display name cannot be empty",
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CmsError::DuplicateField {
                    schema: self.slug.clone(),
                    field: field.name.clone(),
                });
            }

            field.validate().map_err(|e| {
                let message = match e {
                    CmsError::Validation(msg) => msg,
                    other => other.to_string(),
                };
                CmsError::field_validation(&self.slug, &field.name, message)
            })?;
        }

        self.routes
            .validate()
            .map_err(|e| CmsError::schema_validation(&self.slug, e.to_string()))?;

        if let Some(title) = &self.title_field {
            if !self.has_field(title) {
                return Err(CmsError::schema_validation(
                    &self.slug,
                    format!("Title field '{}' is not declared", title),
                ));
            }
        }

        if self.is_taxonomy() && self.title_field_name().is_none() {
            return Err(CmsError::schema_validation(
                &self.slug,
                "Taxonomy schemas need a 'name' or 'title' field",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Declaration format
// ============================================================================

/// On-disk shape of a content type declaration (TOML or JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub kind: SchemaKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,

    #[serde(default, skip_serializing_if = "RouteDescriptor::is_empty")]
    pub routes: RouteDescriptor,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl From<SchemaDeclaration> for ContentTypeSchema {
    fn from(decl: SchemaDeclaration) -> Self {
        let display_name = decl
            .display_name
            .unwrap_or_else(|| humanize(&decl.slug));

        let mut schema = ContentTypeSchema {
            slug: decl.slug,
            display_name,
            description: decl.description,
            icon: decl.icon,
            kind: decl.kind,
            routes: decl.routes,
            title_field: decl.title_field,
            fields: decl.fields,
            field_index: HashMap::new(),
        };
        schema.reindex();
        schema
    }
}

impl From<ContentTypeSchema> for SchemaDeclaration {
    fn from(schema: ContentTypeSchema) -> Self {
        SchemaDeclaration {
            slug: schema.slug,
            display_name: Some(schema.display_name),
            description: schema.description,
            icon: schema.icon,
            kind: schema.kind,
            title_field: schema.title_field,
            routes: schema.routes,
            fields: schema.fields,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

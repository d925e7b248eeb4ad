//! Core types used throughout Brawo CMS
//!
//! This module contains the type tags, status values and storage targets
//! shared by the schema, field and storage crates.

use crate::error::{CmsError, CmsResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a stored entity (primary key of its row)
pub type EntityId = i64;

// ============================================================================
// Field Type Tags
// ============================================================================

/// Type tag declared for a field
///
/// Tags are parsed leniently: aliases used by content type declarations
/// (`integer`, `textarea`, `checkbox`, ...) map onto the canonical variant,
/// and anything unrecognised is preserved in `Unknown` so that it can fall
/// back to plain-string handling instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line string
    #[default]
    String,
    /// Multi-line text
    Text,
    /// Whole number
    Integer,
    /// Fixed-point number (precision/scale)
    Decimal,
    /// True/false
    Boolean,
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
    /// One value out of a fixed list of choices
    Select,
    /// Single id into a taxonomy schema
    Taxonomy,
    /// Zero or more ids into another schema
    Reference,
    /// Ordered list of sub-records
    Repeater,
    /// Arbitrary JSON document
    Json,
    /// Array of strings
    Array,
    /// Single uploaded image
    Image,
    /// Multiple uploaded images
    Images,
    /// Rich text (formatted HTML)
    RichText,
    /// Foreign key to a record of another table
    BelongsTo,
    /// Tag not known to the engine
    Unknown(String),
}

impl FieldType {
    /// Parse a declared tag, resolving aliases
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "string" => FieldType::String,
            "text" | "textarea" => FieldType::Text,
            "integer" | "number" => FieldType::Integer,
            "decimal" | "float" => FieldType::Decimal,
            "boolean" | "checkbox" => FieldType::Boolean,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "select" => FieldType::Select,
            "taxonomy" => FieldType::Taxonomy,
            "reference" | "has_many" => FieldType::Reference,
            "repeater" => FieldType::Repeater,
            "json" => FieldType::Json,
            "array" => FieldType::Array,
            "image" => FieldType::Image,
            "images" => FieldType::Images,
            "rich_text" => FieldType::RichText,
            "belongs_to" => FieldType::BelongsTo,
            _ => FieldType::Unknown(tag.to_string()),
        }
    }

    /// Canonical tag for this type
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Select => "select",
            FieldType::Taxonomy => "taxonomy",
            FieldType::Reference => "reference",
            FieldType::Repeater => "repeater",
            FieldType::Json => "json",
            FieldType::Array => "array",
            FieldType::Image => "image",
            FieldType::Images => "images",
            FieldType::RichText => "rich_text",
            FieldType::BelongsTo => "belongs_to",
            FieldType::Unknown(tag) => tag,
        }
    }

    /// Check if this type stores ids of other entities
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Reference)
    }

    /// Check if this type nests sub-records
    pub fn is_repeater(&self) -> bool {
        matches!(self, FieldType::Repeater)
    }

    /// Check if the tag was not recognised
    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldType::Unknown(_))
    }

    /// Get a user-friendly display name
    pub fn display_name(&self) -> String {
        match self {
            FieldType::String => "String".to_string(),
            FieldType::Text => "Text".to_string(),
            FieldType::Integer => "Integer".to_string(),
            FieldType::Decimal => "Decimal".to_string(),
            FieldType::Boolean => "Boolean".to_string(),
            FieldType::Date => "Date".to_string(),
            FieldType::DateTime => "DateTime".to_string(),
            FieldType::Select => "Select".to_string(),
            FieldType::Taxonomy => "Taxonomy".to_string(),
            FieldType::Reference => "Reference".to_string(),
            FieldType::Repeater => "Repeater".to_string(),
            FieldType::Json => "JSON".to_string(),
            FieldType::Array => "Array".to_string(),
            FieldType::Image => "Image".to_string(),
            FieldType::Images => "Images".to_string(),
            FieldType::RichText => "Rich Text".to_string(),
            FieldType::BelongsTo => "Belongs To".to_string(),
            FieldType::Unknown(tag) => format!("Unknown<{}>", tag),
        }
    }

    /// Get all known (non-`Unknown`) types
    pub fn known() -> Vec<FieldType> {
        vec![
            FieldType::String,
            FieldType::Text,
            FieldType::Integer,
            FieldType::Decimal,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::DateTime,
            FieldType::Select,
            FieldType::Taxonomy,
            FieldType::Reference,
            FieldType::Repeater,
            FieldType::Json,
            FieldType::Array,
            FieldType::Image,
            FieldType::Images,
            FieldType::RichText,
            FieldType::BelongsTo,
        ]
    }
}

impl FromStr for FieldType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldType::parse(s))
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        FieldType::parse(&tag)
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::parse(tag)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Content Status
// ============================================================================

/// Publication status of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "Draft",
            ContentStatus::Published => "Published",
            ContentStatus::Archived => "Archived",
        }
    }

    /// Get all statuses
    pub fn all() -> &'static [ContentStatus] {
        &[
            ContentStatus::Draft,
            ContentStatus::Published,
            ContentStatus::Archived,
        ]
    }
}

impl FromStr for ContentStatus {
    type Err = CmsError;

    fn from_str(s: &str) -> CmsResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            other => Err(CmsError::validation(format!(
                "Status '{}' is not one of draft, published, archived",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Schema Kind
// ============================================================================

/// Whether a schema describes publishable content or a controlled vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    #[default]
    Content,
    Taxonomy,
}

impl SchemaKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SchemaKind::Content => "Content",
            SchemaKind::Taxonomy => "Taxonomy",
        }
    }
}

// ============================================================================
// Database Types
// ============================================================================

/// Supported database dialects for storage materialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::MySQL => "MySQL",
            DatabaseType::SQLite => "SQLite",
        }
    }

    /// Get all supported databases
    pub fn all() -> &'static [DatabaseType] {
        &[
            DatabaseType::PostgreSQL,
            DatabaseType::MySQL,
            DatabaseType::SQLite,
        ]
    }
}

impl FromStr for DatabaseType {
    type Err = CmsError;

    fn from_str(s: &str) -> CmsResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(DatabaseType::PostgreSQL),
            "mysql" => Ok(DatabaseType::MySQL),
            "sqlite" => Ok(DatabaseType::SQLite),
            other => Err(CmsError::InvalidConfig(format!(
                "Unsupported database '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================

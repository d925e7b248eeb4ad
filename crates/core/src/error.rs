//! Error types for Brawo CMS
//!
//! This module provides unified error handling across the engine: schema
//! validation, submitted-value validation, registry lookups, storage
//! materialization, serialization and configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Brawo CMS
#[derive(Debug, Error)]
pub enum CmsError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A schema declaration is inconsistent
    #[error("Schema validation failed for '{schema}': {message}")]
    SchemaValidation { schema: String, message: String },

    /// A single field definition is inconsistent
    #[error("Field validation failed for '{schema}.{field}': {message}")]
    FieldValidation {
        schema: String,
        field: String,
        message: String,
    },

    /// Submitted values failed validation (one entry per offending field)
    #[error("Invalid submission: {0}")]
    Invalid(ValidationErrors),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// No content type registered under this slug
    #[error("Content type not found: {0}")]
    ContentTypeNotFound(String),

    /// Field not declared by the schema
    #[error("Field '{field}' not found in content type '{schema}'")]
    FieldNotFound { schema: String, field: String },

    /// Entity not found in storage
    #[error("Entity {id} not found in '{schema}'")]
    EntityNotFound { schema: String, id: i64 },

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// Duplicate field name inside a schema
    #[error("Duplicate field name: '{field}' already exists in '{schema}'")]
    DuplicateField { schema: String, field: String },

    // ========================================================================
    // Storage Errors
    // ========================================================================
    /// Backing storage for a content type could not be created
    #[error("Failed to materialize storage for '{schema}': {message}")]
    Materialization { schema: String, message: String },

    /// The table already exists (raised by backends on create)
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// The slug is already taken within the content type
    #[error("Slug '{slug}' already exists in '{schema}'")]
    SlugConflict { schema: String, slug: String },

    /// Slug collision resolution gave up
    #[error("Could not find a free slug for '{base}' after {attempts} attempts")]
    SlugExhausted { base: String, attempts: u32 },

    /// Generic storage-layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Declaration file could not be understood
    #[error("Invalid declaration '{path}': {message}")]
    InvalidDeclaration { path: PathBuf, message: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl CmsError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        CmsError::Validation(msg.into())
    }

    /// Create a schema validation error
    pub fn schema_validation(schema: impl Into<String>, msg: impl Into<String>) -> Self {
        CmsError::SchemaValidation {
            schema: schema.into(),
            message: msg.into(),
        }
    }

    /// Create a field validation error
    pub fn field_validation(
        schema: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        CmsError::FieldValidation {
            schema: schema.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        CmsError::Storage(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        CmsError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CmsError::Validation(_)
                | CmsError::SchemaValidation { .. }
                | CmsError::FieldValidation { .. }
                | CmsError::Invalid(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CmsError::ContentTypeNotFound(_)
                | CmsError::FieldNotFound { .. }
                | CmsError::EntityNotFound { .. }
        )
    }

    /// Check if this error came from the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            CmsError::Materialization { .. }
                | CmsError::TableExists(_)
                | CmsError::SlugConflict { .. }
                | CmsError::SlugExhausted { .. }
                | CmsError::Storage(_)
        )
    }

    /// Field-scoped errors carried by an invalid submission, if any
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CmsError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias using CmsError
pub type CmsResult<T> = Result<T, CmsError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> CmsResult<T>;
}

impl<T, E: Into<CmsError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> CmsResult<T> {
        self.map_err(|e| {
            let err: CmsError = e.into();
            CmsError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Field-scoped validation errors
// ============================================================================

/// A validation failure attached to one field (or a nested repeater path
/// such as `features[1].name`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path the error belongs to
    pub field: String,

    /// Human-readable message, phrased to follow the field label
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path with a parent path segment
    pub fn nested_under(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Collection of field-scoped errors returned for an invalid submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        self.errors.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Errors attached to a given field path
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Convert into `Ok(())` when empty, `CmsError::Invalid` otherwise
    pub fn into_result(self) -> CmsResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CmsError::Invalid(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

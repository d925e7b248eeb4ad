//! Storage configuration
//!
//! Chosen once at startup and applied to every content type.

use brawo_core::{CmsError, CmsResult, DatabaseType, ResultExt, Validatable};
use brawo_schema::naming::is_valid_identifier;
use brawo_schema::ContentTypeSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Default name of the shared table of the JSON-column layout
pub const DEFAULT_SHARED_TABLE: &str = "brawo_cms_contents";

/// Default table referenced by `author_id`
pub const DEFAULT_AUTHOR_TABLE: &str = "users";

/// Default bound of the slug collision loop
pub const DEFAULT_MAX_SLUG_ATTEMPTS: u32 = 100;

// ============================================================================
// StorageLayout
// ============================================================================

/// How entity values are laid out in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageLayout {
    /// One table per content type, one column per field
    #[default]
    DedicatedTable,

    /// One shared table, field values in a JSON column
    JsonColumn,
}

impl StorageLayout {
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageLayout::DedicatedTable => "Dedicated table",
            StorageLayout::JsonColumn => "JSON column",
        }
    }
}

impl FromStr for StorageLayout {
    type Err = CmsError;

    fn from_str(s: &str) -> CmsResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dedicated_table" | "dedicated" | "table" => Ok(StorageLayout::DedicatedTable),
            "json_column" | "json" => Ok(StorageLayout::JsonColumn),
            other => Err(CmsError::InvalidConfig(format!(
                "Unsupported storage layout '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for StorageLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// CmsConfig
// ============================================================================

/// Storage configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Target database dialect
    pub database: DatabaseType,

    /// Storage layout for every content type
    pub layout: StorageLayout,

    /// Prefix of dedicated table names
    pub table_prefix: String,

    /// Table of the JSON-column layout
    pub shared_table: String,

    /// Table referenced by the `author_id` base column
    pub author_table: String,

    /// Largest slug suffix tried before giving up
    pub max_slug_attempts: u32,
}

impl CmsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> CmsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| CmsError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config = Self::from_toml(&source)
            .with_context(format!("Invalid configuration in {}", path.display()))?;
        tracing::debug!(path = %path.display(), layout = ?config.layout, "configuration loaded");
        Ok(config)
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml(source: &str) -> CmsResult<Self> {
        let config: CmsConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_database(mut self, database: DatabaseType) -> Self {
        self.database = database;
        self
    }

    pub fn with_layout(mut self, layout: StorageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_shared_table(mut self, table: impl Into<String>) -> Self {
        self.shared_table = table.into();
        self
    }

    pub fn with_author_table(mut self, table: impl Into<String>) -> Self {
        self.author_table = table.into();
        self
    }

    pub fn with_max_slug_attempts(mut self, attempts: u32) -> Self {
        self.max_slug_attempts = attempts;
        self
    }

    /// Table holding the entities of a schema
    pub fn table_for(&self, schema: &ContentTypeSchema) -> String {
        match self.layout {
            StorageLayout::DedicatedTable => schema.table_name(&self.table_prefix),
            StorageLayout::JsonColumn => self.shared_table.clone(),
        }
    }
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            database: DatabaseType::PostgreSQL,
            layout: StorageLayout::DedicatedTable,
            table_prefix: String::new(),
            shared_table: DEFAULT_SHARED_TABLE.to_string(),
            author_table: DEFAULT_AUTHOR_TABLE.to_string(),
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
        }
    }
}

impl Validatable for CmsConfig {
    fn validate(&self) -> CmsResult<()> {
        if self.max_slug_attempts == 0 {
            return Err(CmsError::InvalidConfig(
                "max_slug_attempts must be at least 1".to_string(),
            ));
        }

        for (key, table) in [
            ("shared_table", &self.shared_table),
            ("author_table", &self.author_table),
        ] {
            if !is_valid_identifier(table) {
                return Err(CmsError::InvalidConfig(format!(
                    "{} '{}' is not a valid table name",
                    key, table
                )));
            }
        }

        let prefix_ok = self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !prefix_ok {
            return Err(CmsError::InvalidConfig(format!(
                "table_prefix '{}' may only contain lowercase letters, digits and '_'",
                self.table_prefix
            )));
        }

        Ok(())
    }
}

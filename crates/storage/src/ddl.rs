//! Storage shape derivation
//!
//! Turns a content type schema into a dialect-neutral [`TableDef`] and
//! renders it as `CREATE TABLE IF NOT EXISTS` statements for each supported
//! database.

use crate::config::CmsConfig;
use brawo_core::{CmsError, CmsResult, DatabaseType, FieldType};
use brawo_schema::naming::pluralize;
use brawo_schema::{ContentTypeSchema, FieldDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Columns every dedicated table starts with (timestamps are appended last)
pub const BASE_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "status",
    "published_at",
    "author_id",
    "created_at",
    "updated_at",
];

const DEFAULT_PRECISION: u32 = 10;
const DEFAULT_SCALE: u32 = 2;

// ============================================================================
// ColumnType
// ============================================================================

/// Dialect-neutral column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ColumnType {
    /// Auto-incrementing primary key
    PrimaryKey,
    /// Foreign key or single id
    Id,
    String,
    Text,
    Integer,
    Decimal { precision: u32, scale: u32 },
    Boolean,
    Date,
    DateTime,
    Json,
    StringArray,
    IdArray,
}

impl ColumnType {
    /// SQL type for a database
    pub fn sql_type(&self, db: DatabaseType) -> String {
        match self {
            ColumnType::PrimaryKey => match db {
                DatabaseType::PostgreSQL => "BIGSERIAL PRIMARY KEY".into(),
                DatabaseType::MySQL => "BIGINT AUTO_INCREMENT PRIMARY KEY".into(),
                DatabaseType::SQLite => "INTEGER PRIMARY KEY AUTOINCREMENT".into(),
            },
            ColumnType::Id => match db {
                DatabaseType::PostgreSQL | DatabaseType::MySQL => "BIGINT".into(),
                DatabaseType::SQLite => "INTEGER".into(),
            },
            ColumnType::String => match db {
                DatabaseType::PostgreSQL | DatabaseType::MySQL => "VARCHAR(255)".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
            ColumnType::Text => match db {
                DatabaseType::PostgreSQL => "TEXT".into(),
                DatabaseType::MySQL => "LONGTEXT".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
            ColumnType::Integer => match db {
                DatabaseType::PostgreSQL => "INTEGER".into(),
                DatabaseType::MySQL => "INT".into(),
                DatabaseType::SQLite => "INTEGER".into(),
            },
            ColumnType::Decimal { precision, scale } => match db {
                DatabaseType::PostgreSQL => format!("NUMERIC({}, {})", precision, scale),
                DatabaseType::MySQL => format!("DECIMAL({}, {})", precision, scale),
                DatabaseType::SQLite => "NUMERIC".into(),
            },
            ColumnType::Boolean => match db {
                DatabaseType::PostgreSQL => "BOOLEAN".into(),
                DatabaseType::MySQL => "TINYINT(1)".into(),
                DatabaseType::SQLite => "INTEGER".into(),
            },
            ColumnType::Date => match db {
                DatabaseType::PostgreSQL | DatabaseType::MySQL => "DATE".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
            ColumnType::DateTime => match db {
                DatabaseType::PostgreSQL => "TIMESTAMP WITH TIME ZONE".into(),
                DatabaseType::MySQL => "DATETIME".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
            ColumnType::Json => match db {
                DatabaseType::PostgreSQL => "JSONB".into(),
                DatabaseType::MySQL => "JSON".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
            // PostgreSQL has native arrays; others fall back to JSON
            ColumnType::StringArray => match db {
                DatabaseType::PostgreSQL => "VARCHAR(255)[]".into(),
                DatabaseType::MySQL => "JSON".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
            ColumnType::IdArray => match db {
                DatabaseType::PostgreSQL => "BIGINT[]".into(),
                DatabaseType::MySQL => "JSON".into(),
                DatabaseType::SQLite => "TEXT".into(),
            },
        }
    }

    /// SQL literal of an empty array of this type
    fn empty_array_default(&self, db: DatabaseType) -> Option<String> {
        match (self, db) {
            (ColumnType::StringArray | ColumnType::IdArray, DatabaseType::PostgreSQL) => {
                Some("'{}'".into())
            }
            (ColumnType::StringArray | ColumnType::IdArray, DatabaseType::SQLite) => {
                Some("'[]'".into())
            }
            _ => None,
        }
    }
}

// ============================================================================
// ColumnDef / IndexDef / TableDef
// ============================================================================

/// Default value of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    Bool(bool),
    Text(String),
    Number(String),
    CurrentTimestamp,
    EmptyArray,
    EmptyObject,
}

impl ColumnDefault {
    fn to_sql(&self, column_type: &ColumnType, db: DatabaseType) -> Option<String> {
        let clause = match self {
            ColumnDefault::Bool(b) => match db {
                DatabaseType::PostgreSQL => if *b { "TRUE" } else { "FALSE" }.to_string(),
                _ => if *b { "1" } else { "0" }.to_string(),
            },
            ColumnDefault::Text(s) => format!("'{}'", s.replace('\'', "''")),
            ColumnDefault::Number(n) => n.clone(),
            ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
            ColumnDefault::EmptyArray => column_type.empty_array_default(db)?,
            // MySQL rejects literal defaults on JSON columns
            ColumnDefault::EmptyObject => match db {
                DatabaseType::MySQL => return None,
                _ => "'{}'".to_string(),
            },
        };
        Some(format!("DEFAULT {}", clause))
    }
}

/// One column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    /// Referenced table of a foreign key
    pub references: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            unique: false,
            default: None,
            references: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn references(mut self, table: impl Into<String>) -> Self {
        self.references = Some(table.into());
        self
    }

    fn to_sql(&self, db: DatabaseType) -> String {
        let mut parts = vec![self.name.clone(), self.column_type.sql_type(db)];

        if !self.nullable && self.column_type != ColumnType::PrimaryKey {
            parts.push("NOT NULL".to_string());
        }
        if let Some(default) = self
            .default
            .as_ref()
            .and_then(|d| d.to_sql(&self.column_type, db))
        {
            parts.push(default);
        }
        if let Some(table) = &self.references {
            parts.push(format!("REFERENCES {}(id)", table));
        }

        parts.join(" ")
    }
}

/// Index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    /// Containment (GIN) index over a JSON column; PostgreSQL only
    pub containment: bool,
}

impl IndexDef {
    fn on(table: &str, columns: &[&str]) -> Self {
        Self {
            name: format!("index_{}_on_{}", table, columns.join("_and_")),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
            containment: false,
        }
    }

    fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn containment(mut self) -> Self {
        self.containment = true;
        self
    }

    fn to_sql(&self, table: &str, db: DatabaseType) -> Option<String> {
        if self.containment && db != DatabaseType::PostgreSQL {
            return None;
        }

        let unique = if self.unique { "UNIQUE " } else { "" };
        let if_not_exists = match db {
            DatabaseType::MySQL => "",
            _ => "IF NOT EXISTS ",
        };
        let using = if self.containment { " USING GIN" } else { "" };

        Some(format!(
            "CREATE {}INDEX {}{} ON {}{} ({});",
            unique,
            if_not_exists,
            self.name,
            table,
            using,
            self.columns.join(", ")
        ))
    }
}

/// Storage shape of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    /// Dedicated table of a schema: base columns plus one column per field
    pub fn for_schema(schema: &ContentTypeSchema, config: &CmsConfig) -> CmsResult<Self> {
        let name = schema.table_name(&config.table_prefix);

        let mut columns = vec![
            ColumnDef::new("id", ColumnType::PrimaryKey).not_null(),
            ColumnDef::new("slug", ColumnType::String).not_null().unique(),
            ColumnDef::new("status", ColumnType::String)
                .not_null()
                .with_default(ColumnDefault::Text("draft".to_string())),
            ColumnDef::new("published_at", ColumnType::DateTime),
            ColumnDef::new("author_id", ColumnType::Id).references(&config.author_table),
        ];

        for field in schema.fields() {
            let column = field_column(field, config);
            if BASE_COLUMNS.contains(&column.name.as_str()) {
                return Err(CmsError::Materialization {
                    schema: schema.slug.clone(),
                    message: format!(
                        "field '{}' collides with the base column '{}'",
                        field.name, column.name
                    ),
                });
            }
            columns.push(column);
        }

        columns.extend(timestamp_columns());

        let mut indexes = vec![
            IndexDef::on(&name, &["slug"]).unique(),
            IndexDef::on(&name, &["status"]),
        ];
        indexes.extend(
            schema
                .fields()
                .iter()
                .filter(|f| f.unique)
                .map(|f| IndexDef::on(&name, &[field_column(f, config).name.as_str()]).unique()),
        );

        Ok(Self {
            name,
            columns,
            indexes,
        })
    }

    /// Shared table of the JSON-column layout
    pub fn shared(config: &CmsConfig) -> Self {
        let name = config.shared_table.clone();

        let mut columns = vec![
            ColumnDef::new("id", ColumnType::PrimaryKey).not_null(),
            ColumnDef::new("type", ColumnType::String).not_null(),
            ColumnDef::new("slug", ColumnType::String).not_null(),
            ColumnDef::new("status", ColumnType::String)
                .not_null()
                .with_default(ColumnDefault::Text("draft".to_string())),
            ColumnDef::new("published_at", ColumnType::DateTime),
            ColumnDef::new("author_id", ColumnType::Id).references(&config.author_table),
            ColumnDef::new("fields", ColumnType::Json)
                .not_null()
                .with_default(ColumnDefault::EmptyObject),
        ];
        columns.extend(timestamp_columns());

        let indexes = vec![
            IndexDef::on(&name, &["type"]),
            IndexDef::on(&name, &["type", "slug"]).unique(),
            IndexDef::on(&name, &["status"]),
            IndexDef::on(&name, &["fields"]).containment(),
        ];

        Self {
            name,
            columns,
            indexes,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `CREATE TABLE` and `CREATE INDEX` statements for a database
    pub fn to_sql(&self, db: DatabaseType) -> Vec<String> {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.to_sql(db)))
            .collect();

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            columns.join(",\n")
        )];

        statements.extend(
            self.indexes
                .iter()
                .filter_map(|index| index.to_sql(&self.name, db)),
        );

        statements
    }
}

fn timestamp_columns() -> [ColumnDef; 2] {
    [
        ColumnDef::new("created_at", ColumnType::DateTime)
            .not_null()
            .with_default(ColumnDefault::CurrentTimestamp),
        ColumnDef::new("updated_at", ColumnType::DateTime)
            .not_null()
            .with_default(ColumnDefault::CurrentTimestamp),
    ]
}

/// Column backing one declared field
pub fn field_column(field: &FieldDefinition, config: &CmsConfig) -> ColumnDef {
    let name = field.name.clone();

    let column = match &field.field_type {
        FieldType::String | FieldType::Select => ColumnDef::new(name, ColumnType::String),
        FieldType::Text | FieldType::RichText => ColumnDef::new(name, ColumnType::Text),
        FieldType::Integer => ColumnDef::new(name, ColumnType::Integer),
        FieldType::Decimal => ColumnDef::new(
            name,
            ColumnType::Decimal {
                precision: field.precision.unwrap_or(DEFAULT_PRECISION),
                scale: field.scale.unwrap_or(DEFAULT_SCALE),
            },
        ),
        FieldType::Boolean => {
            let column = ColumnDef::new(name, ColumnType::Boolean);
            match &field.default {
                Some(Value::Bool(b)) => column.with_default(ColumnDefault::Bool(*b)),
                _ => column,
            }
        }
        FieldType::Date => ColumnDef::new(name, ColumnType::Date),
        FieldType::DateTime => ColumnDef::new(name, ColumnType::DateTime),
        FieldType::Taxonomy => ColumnDef::new(name, ColumnType::Id),
        FieldType::Reference => {
            ColumnDef::new(name, ColumnType::IdArray).with_default(ColumnDefault::EmptyArray)
        }
        FieldType::Repeater | FieldType::Json => ColumnDef::new(name, ColumnType::Json),
        FieldType::Array => {
            ColumnDef::new(name, ColumnType::StringArray).with_default(ColumnDefault::EmptyArray)
        }
        // Attachment placeholders: a stored path, or a JSON list of paths
        FieldType::Image => ColumnDef::new(name, ColumnType::String),
        FieldType::Images => ColumnDef::new(name, ColumnType::Json),
        FieldType::BelongsTo => {
            let column_name = if name.ends_with("_id") {
                name
            } else {
                format!("{}_id", name)
            };
            let column = ColumnDef::new(column_name, ColumnType::Id);
            match &field.target_schema {
                Some(target) => {
                    column.references(format!("{}{}", config.table_prefix, pluralize(target)))
                }
                None => column,
            }
        }
        FieldType::Unknown(tag) => {
            tracing::debug!(field = %field.name, tag = %tag, "unknown field type stored as string");
            ColumnDef::new(name, ColumnType::String)
        }
    };

    match (&column.default, &field.default, &field.field_type) {
        (None, Some(Value::Number(n)), FieldType::Integer | FieldType::Decimal) => {
            column.with_default(ColumnDefault::Number(n.to_string()))
        }
        (None, Some(Value::String(s)), FieldType::String | FieldType::Select) => {
            column.with_default(ColumnDefault::Text(s.clone()))
        }
        _ => column,
    }
}

// ============================================================================
// Tests
// ============================================================================

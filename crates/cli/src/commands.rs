//! Command implementations
//!
//! Every command writes to the given output so it can be captured in tests.

use anyhow::{Context, Result, bail};
use brawo_core::DatabaseType;
use brawo_fields::{FieldTypeRegistry, NoLookup, SchemaForm};
use brawo_schema::{
    ContentTypeRegistry, ContentTypeSchema, DynamicEntity, SealedRegistry, Validator,
    load_registry,
};
use brawo_storage::{CmsConfig, InMemoryStore, SchemaMaterializer, StorageLayout, TableDef};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// Workspace
// ============================================================================

/// Declaration directory plus the storage configuration applied to it
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dir: PathBuf,
    pub config: CmsConfig,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>, config: CmsConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
        }
    }

    /// Load the configuration file if one is given, defaults otherwise
    pub fn load(dir: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => CmsConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => CmsConfig::default(),
        };
        Ok(Self::new(dir, config))
    }

    fn registry(&self) -> Result<ContentTypeRegistry> {
        load_registry(&self.dir).with_context(|| {
            format!("Failed to load content types from {}", self.dir.display())
        })
    }

    fn sealed(&self) -> Result<SealedRegistry> {
        self.registry()?
            .seal()
            .context("Content type declarations are invalid (run `brawo check`)")
    }
}

// ============================================================================
// check
// ============================================================================

/// Validate the declarations and materialize them against an in-memory store
pub fn check(workspace: &Workspace, strict: bool, out: &mut impl Write) -> Result<()> {
    let registry = workspace.registry()?;
    writeln!(
        out,
        "Checking {} content type(s) in {}",
        registry.len(),
        workspace.dir.display()
    )?;

    let result = Validator::with_default_rules().validate(&registry);
    for error in &result.errors {
        writeln!(out, "  {} {}", "✗".red(), error)?;
    }
    for warning in &result.warnings {
        writeln!(out, "  {} {}", "⚠".yellow(), warning)?;
    }

    if result.has_errors() {
        writeln!(out, "\n{} Validation failed.", "✗".red())?;
        bail!("{} validation error(s)", result.errors.len());
    }

    // Already validated above; seal without re-running the rules
    let registry = registry.seal_with(&Validator::new())?;
    let store = InMemoryStore::new();
    let report = SchemaMaterializer::new(&store, &workspace.config).materialize_all(&registry);

    for schema in registry.all() {
        if report.is_servable(&schema.slug) {
            writeln!(
                out,
                "  {} {} ({}, {} field(s)) -> {}",
                "✓".green(),
                schema.slug,
                schema.kind.display_name(),
                schema.fields().len(),
                workspace.config.table_for(schema)
            )?;
        }
    }
    for (slug, reason) in &report.failed {
        writeln!(out, "  {} {}: {}", "✗".red(), slug, reason)?;
    }

    if !report.is_complete() {
        writeln!(out, "\n{} Storage could not be derived for every content type.", "✗".red())?;
        bail!("{} content type(s) not servable", report.failed.len());
    }

    if strict && result.has_warnings() {
        writeln!(out, "\n{} Warnings are errors with --strict.", "✗".red())?;
        bail!("{} warning(s)", result.warnings.len());
    }

    writeln!(
        out,
        "\n{} {} content type(s) servable ({}, {}).",
        "✓".green(),
        report.servable.len(),
        workspace.config.database,
        workspace.config.layout
    )?;
    Ok(())
}

// ============================================================================
// ddl
// ============================================================================

/// Print CREATE TABLE / CREATE INDEX statements
pub fn ddl(
    workspace: &Workspace,
    database: Option<DatabaseType>,
    layout: Option<StorageLayout>,
    only: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let mut config = workspace.config.clone();
    if let Some(database) = database {
        config = config.with_database(database);
    }
    if let Some(layout) = layout {
        config = config.with_layout(layout);
    }

    let registry = workspace.sealed()?;
    let schemas: Vec<&Arc<ContentTypeSchema>> = match only {
        Some(slug) => vec![registry.require(slug)?],
        None => registry.all().iter().collect(),
    };

    writeln!(out, "-- {} / {}", config.database, config.layout)?;

    match config.layout {
        StorageLayout::JsonColumn => {
            let slugs: Vec<&str> = schemas.iter().map(|s| s.slug.as_str()).collect();
            writeln!(out, "-- content types: {}", slugs.join(", "))?;
            for statement in TableDef::shared(&config).to_sql(config.database) {
                writeln!(out, "{}", statement)?;
            }
        }
        StorageLayout::DedicatedTable => {
            for schema in schemas {
                let table = TableDef::for_schema(schema, &config)
                    .with_context(|| format!("Cannot derive a table for '{}'", schema.slug))?;

                writeln!(out, "\n-- {}", schema.display_name)?;
                for statement in table.to_sql(config.database) {
                    writeln!(out, "{}", statement)?;
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// routes
// ============================================================================

/// Print the public route table
pub fn routes(workspace: &Workspace, json: bool, out: &mut impl Write) -> Result<()> {
    let routes = workspace.sealed()?.route_table();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&routes)?)?;
        return Ok(());
    }

    if routes.is_empty() {
        writeln!(out, "No public routes declared.")?;
        return Ok(());
    }

    for route in &routes {
        writeln!(out, "{}", route)?;
    }
    Ok(())
}

// ============================================================================
// fields
// ============================================================================

/// List field type tags, or the fields of one content type
pub fn fields(
    workspace: &Workspace,
    content_type: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let field_types = FieldTypeRegistry::new();

    let Some(slug) = content_type else {
        for (tag, kind) in field_types.tags() {
            writeln!(out, "  {:<14} {}", tag, kind.as_str())?;
        }
        writeln!(out, "\nUnregistered tags are handled as {}.", "string".bold())?;
        return Ok(());
    };

    let registry = workspace.sealed()?;
    let schema = registry.require(slug)?;
    let form = SchemaForm::build(schema, &field_types);

    if json {
        let blank = DynamicEntity::for_schema(schema);
        let inputs = form.describe(&blank, &NoLookup);
        writeln!(out, "{}", serde_json::to_string_pretty(&inputs)?)?;
        return Ok(());
    }

    writeln!(out, "{} ({})", schema.display_name.bold(), schema.slug)?;
    for field in form.fields() {
        let tag = field.definition().field_type.as_str();
        let fallback = if field_types.is_registered(tag) {
            String::new()
        } else {
            format!(" {}", "(unregistered, handled as string)".yellow())
        };
        let required = if field.is_required() { " *" } else { "" };

        writeln!(
            out,
            "  {:<20} {:<12} {:<10} {}{}{}",
            field.name(),
            tag,
            field.kind().as_str(),
            field.label(),
            required,
            fallback
        )?;

        for sub in field.sub_fields() {
            writeln!(
                out,
                "    {:<18} {:<12} {:<10} {}",
                sub.name(),
                sub.definition().field_type.as_str(),
                sub.kind().as_str(),
                sub.label()
            )?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

//! Declaration discovery and loading
//!
//! Content types are declared in `*_type.toml` or `*_type.json` files. A
//! directory is scanned recursively and files are loaded in path order so
//! that registration order is stable across runs.

use crate::content_type::ContentTypeSchema;
use crate::registry::ContentTypeRegistry;
use brawo_core::{CmsError, CmsResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// ============================================================================
// Constants
// ============================================================================

/// File name suffix of TOML declarations
pub const TOML_SUFFIX: &str = "_type.toml";

/// File name suffix of JSON declarations
pub const JSON_SUFFIX: &str = "_type.json";

/// Format of a declaration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    Toml,
    Json,
}

impl DeclarationFormat {
    /// Detect the format from a file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(TOML_SUFFIX) {
            Some(DeclarationFormat::Toml)
        } else if name.ends_with(JSON_SUFFIX) {
            Some(DeclarationFormat::Json)
        } else {
            None
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Find declaration files under a directory, sorted by path
pub fn discover_declarations(dir: impl AsRef<Path>) -> CmsResult<Vec<PathBuf>> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(CmsError::FileRead {
            path: dir.to_path_buf(),
            message: "Not a directory".to_string(),
        });
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| CmsError::FileRead {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() && DeclarationFormat::from_path(entry.path()).is_some() {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    tracing::debug!(dir = %dir.display(), found = paths.len(), "declarations discovered");
    Ok(paths)
}

// ============================================================================
// Load / Save
// ============================================================================

/// Parse a declaration from source text
pub fn parse_declaration(source: &str, format: DeclarationFormat) -> CmsResult<ContentTypeSchema> {
    let schema = match format {
        DeclarationFormat::Toml => toml::from_str(source)?,
        DeclarationFormat::Json => serde_json::from_str(source)?,
    };
    Ok(schema)
}

/// Load one declaration file
pub fn load_schema_file(path: impl AsRef<Path>) -> CmsResult<ContentTypeSchema> {
    let path = path.as_ref();

    let format = DeclarationFormat::from_path(path).ok_or_else(|| CmsError::InvalidDeclaration {
        path: path.to_path_buf(),
        message: format!("File name must end with '{}' or '{}'", TOML_SUFFIX, JSON_SUFFIX),
    })?;

    let source = std::fs::read_to_string(path).map_err(|e| CmsError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_declaration(&source, format).map_err(|e| CmsError::InvalidDeclaration {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a schema as a declaration file (format chosen by file name)
pub fn save_schema_file(schema: &ContentTypeSchema, path: impl AsRef<Path>) -> CmsResult<()> {
    let path = path.as_ref();

    let format = DeclarationFormat::from_path(path).ok_or_else(|| CmsError::InvalidDeclaration {
        path: path.to_path_buf(),
        message: format!("File name must end with '{}' or '{}'", TOML_SUFFIX, JSON_SUFFIX),
    })?;

    let text = match format {
        DeclarationFormat::Toml => toml::to_string_pretty(schema).map_err(|e| e.to_string()),
        DeclarationFormat::Json => serde_json::to_string_pretty(schema).map_err(|e| e.to_string()),
    }
    .map_err(|message| CmsError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize declaration: {}", message),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| CmsError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, text).map_err(|e| CmsError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Discover and register every declaration under a directory
pub fn load_registry(dir: impl AsRef<Path>) -> CmsResult<ContentTypeRegistry> {
    let mut registry = ContentTypeRegistry::new();

    for path in discover_declarations(dir)? {
        let schema = load_schema_file(&path)?;
        registry.add(schema).map_err(|e| CmsError::InvalidDeclaration {
            path: path.clone(),
            message: e.to_string(),
        })?;
    }

    Ok(registry)
}

// ============================================================================
// Tests
// ============================================================================

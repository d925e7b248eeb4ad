//! Public URL patterns attached to a content type
//!
//! A schema may expose an archive page (list of published entities) and a
//! single page per entity. The single pattern carries a `:slug` placeholder
//! that is substituted with the entity slug.

use brawo_core::{CmsError, CmsResult, Validatable};
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the entity slug in single-entity patterns
pub const SLUG_PLACEHOLDER: &str = ":slug";

// ============================================================================
// RouteDescriptor
// ============================================================================

/// Archive path and single-entity pattern for a content type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Path of the archive page (e.g. `/blog`)
    #[serde(default, alias = "archive", skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,

    /// Pattern of single-entity pages (e.g. `/blog/:slug`)
    #[serde(default, alias = "single", skip_serializing_if = "Option::is_none")]
    pub single_pattern: Option<String>,
}

impl RouteDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the archive path
    pub fn with_archive(mut self, path: impl Into<String>) -> Self {
        self.archive_path = Some(path.into());
        self
    }

    /// Set the single-entity pattern
    pub fn with_single(mut self, pattern: impl Into<String>) -> Self {
        self.single_pattern = Some(pattern.into());
        self
    }

    /// Check if neither route is declared
    pub fn is_empty(&self) -> bool {
        self.archive_path.is_none() && self.single_pattern.is_none()
    }

    /// Concrete path of one entity's page, if a single pattern is declared
    pub fn single_path(&self, entity_slug: &str) -> Option<String> {
        self.single_pattern
            .as_ref()
            .map(|pattern| pattern.replace(SLUG_PLACEHOLDER, entity_slug))
    }
}

impl Validatable for RouteDescriptor {
    fn validate(&self) -> CmsResult<()> {
        if let Some(archive) = &self.archive_path {
            if !archive.starts_with('/') {
                return Err(CmsError::validation(format!(
                    "Archive path '{}' must start with '/'",
                    archive
                )));
            }
        }

        if let Some(single) = &self.single_pattern {
            if !single.starts_with('/') {
                return Err(CmsError::validation(format!(
                    "Single route '{}' must start with '/'",
                    single
                )));
            }
            if !single.contains(SLUG_PLACEHOLDER) {
                return Err(CmsError::validation(format!(
                    "Single route '{}' must contain '{}'",
                    single, SLUG_PLACEHOLDER
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Route table
// ============================================================================

/// What a public route renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAction {
    Archive,
    Single,
}

impl RouteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteAction::Archive => "archive",
            RouteAction::Single => "single",
        }
    }
}

/// One named entry of the public route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route name (`{slug}_archive` or the singular slug)
    pub name: String,

    /// HTTP method (always GET for public pages)
    pub method: String,

    /// Path or pattern
    pub path: String,

    /// Archive or single page
    pub action: RouteAction,

    /// Slug of the content type that serves it
    pub content_type: String,
}

impl Route {
    pub fn archive(content_type: &str, path: impl Into<String>) -> Self {
        Self {
            name: format!("{}_archive", content_type.replace('-', "_")),
            method: "GET".to_string(),
            path: path.into(),
            action: RouteAction::Archive,
            content_type: content_type.to_string(),
        }
    }

    pub fn single(content_type: &str, pattern: impl Into<String>) -> Self {
        Self {
            name: crate::naming::singularize(content_type),
            method: "GET".to_string(),
            path: pattern.into(),
            action: RouteAction::Single,
            content_type: content_type.to_string(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<6} {:<30} {} ({}#{})",
            self.method,
            self.path,
            self.name,
            self.content_type,
            self.action.as_str()
        )
    }
}

/// Routes contributed by one content type, archive first
pub fn routes_for(content_type: &str, descriptor: &RouteDescriptor) -> Vec<Route> {
    let mut routes = Vec::new();

    if let Some(archive) = &descriptor.archive_path {
        routes.push(Route::archive(content_type, archive.clone()));
    }
    if let Some(single) = &descriptor.single_pattern {
        routes.push(Route::single(content_type, single.clone()));
    }

    routes
}

// ============================================================================
// Tests
// ============================================================================

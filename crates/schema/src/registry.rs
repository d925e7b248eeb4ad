//! Content type registry
//!
//! The registry is filled once at startup, then sealed. Sealing runs the
//! cross-schema validator and yields an immutable [`SealedRegistry`] that
//! request handlers share through an `Arc` and read without locks.

use crate::content_type::ContentTypeSchema;
use crate::route::Route;
use crate::validation::Validator;
use brawo_core::{CmsError, CmsResult, Validatable};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// ContentTypeRegistry
// ============================================================================

/// Mutable slug -> schema map used while declarations are being loaded
#[derive(Debug, Clone, Default)]
pub struct ContentTypeRegistry {
    schemas: Vec<Arc<ContentTypeSchema>>,
    index: HashMap<String, usize>,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a slug, replacing any previous registration
    ///
    /// The key wins over the schema's own slug. A replaced schema keeps the
    /// position of the one it replaces.
    pub fn register(
        &mut self,
        slug: impl Into<String>,
        mut schema: ContentTypeSchema,
    ) -> CmsResult<Arc<ContentTypeSchema>> {
        let slug = slug.into();
        schema.slug = slug.clone();
        schema.validate()?;

        let schema = Arc::new(schema);
        match self.index.get(&slug) {
            Some(&idx) => {
                self.schemas[idx] = Arc::clone(&schema);
                tracing::info!(slug = %slug, "content type replaced");
            }
            None => {
                self.index.insert(slug.clone(), self.schemas.len());
                self.schemas.push(Arc::clone(&schema));
                tracing::info!(
                    slug = %slug,
                    kind = schema.kind.display_name(),
                    fields = schema.fields().len(),
                    "content type registered",
                );
            }
        }

        Ok(schema)
    }

    /// Register a schema under its own slug
    pub fn add(&mut self, schema: ContentTypeSchema) -> CmsResult<Arc<ContentTypeSchema>> {
        let slug = schema.slug.clone();
        self.register(slug, schema)
    }

    /// Look up a schema by slug
    pub fn find(&self, slug: &str) -> Option<&Arc<ContentTypeSchema>> {
        self.index.get(slug).map(|&idx| &self.schemas[idx])
    }

    /// Look up a schema by slug, failing with `ContentTypeNotFound`
    pub fn require(&self, slug: &str) -> CmsResult<&Arc<ContentTypeSchema>> {
        self.find(slug)
            .ok_or_else(|| CmsError::ContentTypeNotFound(slug.to_string()))
    }

    /// All schemas in registration order
    pub fn all(&self) -> &[Arc<ContentTypeSchema>] {
        &self.schemas
    }

    /// Taxonomy schemas in registration order
    pub fn taxonomies(&self) -> impl Iterator<Item = &Arc<ContentTypeSchema>> {
        self.schemas.iter().filter(|s| s.is_taxonomy())
    }

    /// Content (non-taxonomy) schemas in registration order
    pub fn content_types(&self) -> impl Iterator<Item = &Arc<ContentTypeSchema>> {
        self.schemas.iter().filter(|s| !s.is_taxonomy())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Every public route, in registration order
    pub fn route_table(&self) -> Vec<Route> {
        self.schemas.iter().flat_map(|s| s.route_table()).collect()
    }

    /// Validate with the default rules and freeze the registry
    pub fn seal(self) -> CmsResult<SealedRegistry> {
        self.seal_with(&Validator::with_default_rules())
    }

    /// Validate with the given rules and freeze the registry
    pub fn seal_with(self, validator: &Validator) -> CmsResult<SealedRegistry> {
        let result = validator.validate(&self);

        for warning in &result.warnings {
            tracing::warn!("{}", warning);
        }
        result.to_result()?;

        tracing::info!(content_types = self.len(), "content type registry sealed");
        Ok(SealedRegistry { inner: self })
    }
}

// ============================================================================
// SealedRegistry
// ============================================================================

/// Immutable registry shared by request handlers
#[derive(Debug, Clone)]
pub struct SealedRegistry {
    inner: ContentTypeRegistry,
}

impl SealedRegistry {
    pub fn find(&self, slug: &str) -> Option<&Arc<ContentTypeSchema>> {
        self.inner.find(slug)
    }

    pub fn require(&self, slug: &str) -> CmsResult<&Arc<ContentTypeSchema>> {
        self.inner.require(slug)
    }

    pub fn all(&self) -> &[Arc<ContentTypeSchema>] {
        self.inner.all()
    }

    pub fn taxonomies(&self) -> impl Iterator<Item = &Arc<ContentTypeSchema>> {
        self.inner.taxonomies()
    }

    pub fn content_types(&self) -> impl Iterator<Item = &Arc<ContentTypeSchema>> {
        self.inner.content_types()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.inner.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn route_table(&self) -> Vec<Route> {
        self.inner.route_table()
    }

    /// Turn back into a mutable registry (test reloads)
    pub fn reopen(self) -> ContentTypeRegistry {
        self.inner
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use crate::route::RouteDescriptor;

    fn blog() -> ContentTypeSchema {
        ContentTypeSchema::new("blog", "Blog Post")
            .with_field(FieldDefinition::string("title").required())
            .with_routes(
                RouteDescriptor::new()
                    .with_archive("/blog")
                    .with_single("/blog/:slug"),
            )
    }

    #[test]
    fn test_register_then_find_returns_same_schema() {
        let mut registry = ContentTypeRegistry::new();
        let registered = registry.register("blog", blog()).unwrap();

        let found = registry.find("blog").unwrap();
        assert!(Arc::ptr_eq(found, &registered));
        assert!(registry.find("faqs").is_none());
        assert!(registry.require("faqs").unwrap_err().is_not_found());
    }

    #[test]
    fn test_reregister_replaces_and_keeps_position() {
        let mut registry = ContentTypeRegistry::new();
        registry.register("blog", blog()).unwrap();
        registry
            .register("faqs", ContentTypeSchema::new("faqs", "FAQ"))
            .unwrap();

        let replacement = ContentTypeSchema::new("blog", "Article")
            .with_field(FieldDefinition::string("headline"));
        registry.register("blog", replacement).unwrap();

        assert_eq!(registry.len(), 2);
        let slugs: Vec<_> = registry.all().iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["blog", "faqs"]);

        let found = registry.find("blog").unwrap();
        assert_eq!(found.display_name, "Article");
        assert!(found.field("title").is_none());
        assert!(found.field("headline").is_some());
    }

    #[test]
    fn test_register_key_wins_over_schema_slug() {
        let mut registry = ContentTypeRegistry::new();
        registry
            .register("news", ContentTypeSchema::new("blog", "Blog"))
            .unwrap();
        assert_eq!(registry.find("news").unwrap().slug, "news");
        assert!(!registry.contains("blog"));
    }

    #[test]
    fn test_register_rejects_invalid_schema() {
        let mut registry = ContentTypeRegistry::new();
        let bad = ContentTypeSchema::new("faqs", "FAQ")
            .with_field(FieldDefinition::string("q"))
            .with_field(FieldDefinition::string("q"));
        assert!(registry.register("faqs", bad).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_taxonomies_and_content_types() {
        let mut registry = ContentTypeRegistry::new();
        registry.add(blog()).unwrap();
        registry
            .add(ContentTypeSchema::taxonomy("categories", "Category"))
            .unwrap();

        assert_eq!(registry.taxonomies().count(), 1);
        assert_eq!(registry.content_types().count(), 1);
    }

    #[test]
    fn test_seal_and_reopen() {
        let mut registry = ContentTypeRegistry::new();
        registry.add(blog()).unwrap();

        let sealed = registry.seal().unwrap();
        assert_eq!(sealed.len(), 1);
        assert_eq!(sealed.route_table().len(), 2);
        assert_eq!(sealed.route_table()[0].name, "blog_archive");

        let mut reopened = sealed.reopen();
        reopened
            .add(ContentTypeSchema::new("faqs", "FAQ"))
            .unwrap();
        assert_eq!(reopened.seal().unwrap().len(), 2);
    }

    #[test]
    fn test_seal_fails_on_route_collision() {
        let mut registry = ContentTypeRegistry::new();
        registry.add(blog()).unwrap();
        registry
            .add(ContentTypeSchema::new("news", "News").with_routes(RouteDescriptor::new().with_archive("/blog")))
            .unwrap();

        assert!(registry.seal().is_err());
    }

    #[test]
    fn test_sealed_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SealedRegistry>();
        assert_send_sync::<Arc<SealedRegistry>>();
    }
}

//! Entity persistence flows
//!
//! `ContentRepository` ties the sealed registry, the field strategies and a
//! storage backend together: it creates drafts from submissions, assigns
//! unique slugs, enforces required fields on publish and resolves entity
//! references for display.

use crate::backend::StorageBackend;
use crate::config::CmsConfig;
use crate::slug;
use brawo_core::{CmsError, CmsResult, ContentStatus, EntityId, Timestamped};
use brawo_fields::{DisplayRow, EntityLookup, FieldTypeRegistry, InputSpec, SchemaForm};
use brawo_schema::{ContentTypeSchema, DynamicEntity, SealedRegistry};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Submission key carrying an explicit slug
pub const SLUG_PARAM: &str = "slug";

/// Create/update/publish flows over a storage backend
pub struct ContentRepository<B: StorageBackend + ?Sized> {
    backend: Arc<B>,
    registry: Arc<SealedRegistry>,
    config: CmsConfig,
    field_types: FieldTypeRegistry,
}

impl<B: StorageBackend + ?Sized> ContentRepository<B> {
    pub fn new(backend: Arc<B>, registry: Arc<SealedRegistry>, config: CmsConfig) -> Self {
        Self {
            backend,
            registry,
            config,
            field_types: FieldTypeRegistry::new(),
        }
    }

    /// Use a custom field type registry
    pub fn with_field_types(mut self, field_types: FieldTypeRegistry) -> Self {
        self.field_types = field_types;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &SealedRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    pub fn schema(&self, content_type: &str) -> CmsResult<&Arc<ContentTypeSchema>> {
        self.registry.require(content_type)
    }

    pub fn form(&self, content_type: &str) -> CmsResult<SchemaForm> {
        Ok(SchemaForm::build(self.schema(content_type)?, &self.field_types))
    }

    /// Unsaved draft with defaults applied
    pub fn new_entity(&self, content_type: &str) -> CmsResult<DynamicEntity> {
        Ok(DynamicEntity::for_schema(self.schema(content_type)?))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a draft from a submission
    pub fn create(&self, content_type: &str, params: &Map<String, Value>) -> CmsResult<DynamicEntity> {
        let schema = self.schema(content_type)?;
        let form = SchemaForm::build(schema, &self.field_types);

        let mut entity = DynamicEntity::for_schema(schema);
        form.apply(&mut entity, params)?;
        if let Some(explicit) = params.get(SLUG_PARAM).and_then(Value::as_str) {
            entity.slug = explicit.to_string();
        }

        let table = self.config.table_for(schema);
        self.insert_with_unique_slug(schema, &table, &mut entity)?;

        tracing::info!(
            content_type = %schema.slug,
            id = ?entity.id,
            slug = %entity.slug,
            "entity created"
        );
        Ok(entity)
    }

    /// Apply a submission to a stored entity
    pub fn update(
        &self,
        content_type: &str,
        id: EntityId,
        params: &Map<String, Value>,
    ) -> CmsResult<DynamicEntity> {
        let schema = self.schema(content_type)?;
        let form = SchemaForm::build(schema, &self.field_types);
        let table = self.config.table_for(schema);

        let mut entity = self.find(content_type, id)?;
        form.apply(&mut entity, params)?;

        if let Some(requested) = params.get(SLUG_PARAM).and_then(Value::as_str) {
            entity.slug = requested.to_string();
            let base = slug::base_slug(schema, &entity);
            entity.slug = slug::first_available(&base, self.config.max_slug_attempts, |candidate| {
                self.backend.slug_exists(&table, &schema.slug, candidate, Some(id))
            })?;
        }

        if entity.status == ContentStatus::Published {
            form.check_publishable(&entity)?;
        }

        entity.touch();
        self.backend.update(&table, &entity)?;
        tracing::debug!(content_type = %schema.slug, id, "entity updated");
        Ok(entity)
    }

    /// Publish now
    pub fn publish(&self, content_type: &str, id: EntityId) -> CmsResult<DynamicEntity> {
        self.publish_at(content_type, id, Utc::now())
    }

    /// Publish with a given publication time (future times schedule it)
    pub fn publish_at(
        &self,
        content_type: &str,
        id: EntityId,
        at: DateTime<Utc>,
    ) -> CmsResult<DynamicEntity> {
        let schema = self.schema(content_type)?;
        let mut entity = self.find(content_type, id)?;

        SchemaForm::build(schema, &self.field_types).check_publishable(&entity)?;

        entity.mark_published(at);
        self.backend.update(&self.config.table_for(schema), &entity)?;
        tracing::info!(content_type = %schema.slug, id, slug = %entity.slug, "entity published");
        Ok(entity)
    }

    pub fn archive(&self, content_type: &str, id: EntityId) -> CmsResult<DynamicEntity> {
        let schema = self.schema(content_type)?;
        let mut entity = self.find(content_type, id)?;

        entity.mark_archived();
        self.backend.update(&self.config.table_for(schema), &entity)?;
        tracing::info!(content_type = %schema.slug, id, "entity archived");
        Ok(entity)
    }

    pub fn delete(&self, content_type: &str, id: EntityId) -> CmsResult<()> {
        let schema = self.schema(content_type)?;
        if self
            .backend
            .delete(&self.config.table_for(schema), &schema.slug, id)?
        {
            tracing::info!(content_type = %schema.slug, id, "entity deleted");
            Ok(())
        } else {
            Err(CmsError::EntityNotFound {
                schema: schema.slug.clone(),
                id,
            })
        }
    }

    fn insert_with_unique_slug(
        &self,
        schema: &ContentTypeSchema,
        table: &str,
        entity: &mut DynamicEntity,
    ) -> CmsResult<()> {
        let base = slug::base_slug(schema, entity);
        let max_attempts = self.config.max_slug_attempts;

        for candidate in slug::candidates(&base, max_attempts) {
            if self
                .backend
                .slug_exists(table, &schema.slug, &candidate, None)?
            {
                continue;
            }

            entity.slug = candidate;
            match self.backend.insert(table, entity) {
                Ok(id) => {
                    entity.id = Some(id);
                    return Ok(());
                }
                Err(CmsError::SlugConflict { slug, .. }) => {
                    tracing::debug!(content_type = %schema.slug, slug = %slug, "slug taken concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(CmsError::SlugExhausted {
            base,
            attempts: max_attempts,
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn find(&self, content_type: &str, id: EntityId) -> CmsResult<DynamicEntity> {
        let schema = self.schema(content_type)?;
        self.backend
            .get(&self.config.table_for(schema), &schema.slug, id)?
            .ok_or_else(|| CmsError::EntityNotFound {
                schema: schema.slug.clone(),
                id,
            })
    }

    pub fn find_by_slug(&self, content_type: &str, slug: &str) -> CmsResult<Option<DynamicEntity>> {
        let schema = self.schema(content_type)?;
        self.backend
            .find_by_slug(&self.config.table_for(schema), &schema.slug, slug)
    }

    pub fn list(
        &self,
        content_type: &str,
        status: Option<ContentStatus>,
    ) -> CmsResult<Vec<DynamicEntity>> {
        let schema = self.schema(content_type)?;
        self.backend
            .list(&self.config.table_for(schema), &schema.slug, status)
    }

    /// Published entities whose publication time has passed
    pub fn published(&self, content_type: &str) -> CmsResult<Vec<DynamicEntity>> {
        Ok(self
            .list(content_type, Some(ContentStatus::Published))?
            .into_iter()
            .filter(DynamicEntity::is_published)
            .collect())
    }

    /// Display rows of an entity, references resolved through this repository
    pub fn display(&self, entity: &DynamicEntity) -> CmsResult<Vec<DisplayRow>> {
        Ok(self.form(&entity.content_type)?.display(entity, self))
    }

    /// Input descriptions of an entity's edit form
    pub fn describe(&self, entity: &DynamicEntity) -> CmsResult<Vec<InputSpec>> {
        Ok(self.form(&entity.content_type)?.describe(entity, self))
    }
}

impl<B: StorageBackend + ?Sized> EntityLookup for ContentRepository<B> {
    fn find_by_ids(&self, content_type: &str, ids: &[EntityId]) -> CmsResult<Vec<DynamicEntity>> {
        let schema = self.schema(content_type)?;
        let table = self.config.table_for(schema);

        ids.iter()
            .filter_map(|id| self.backend.get(&table, &schema.slug, *id).transpose())
            .collect()
    }

    fn all_of(&self, content_type: &str) -> CmsResult<Vec<DynamicEntity>> {
        self.list(content_type, None)
    }
}

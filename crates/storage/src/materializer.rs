//! Schema materialization
//!
//! Ensures that backing storage exists for each registered content type.
//! Creation is check-then-create; a concurrent creator winning the race is
//! not an error. A content type whose storage cannot be created is reported
//! and left out of the servable set.

use crate::backend::StorageBackend;
use crate::config::{CmsConfig, StorageLayout};
use crate::ddl::TableDef;
use brawo_core::{CmsError, CmsResult};
use brawo_schema::{ContentTypeSchema, SealedRegistry};
use serde::Serialize;

/// What `ensure_storage_exists` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialized {
    Created,
    AlreadyExists,
}

/// Outcome of materializing a whole registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializationReport {
    /// Content types with usable storage, in registry order
    pub servable: Vec<String>,

    /// Content types whose storage could not be created, with the reason
    pub failed: Vec<(String, String)>,
}

impl MaterializationReport {
    pub fn is_servable(&self, slug: &str) -> bool {
        self.servable.iter().any(|s| s == slug)
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Creates storage for schemas on a backend
pub struct SchemaMaterializer<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
    config: &'a CmsConfig,
}

impl<'a, B: StorageBackend + ?Sized> SchemaMaterializer<'a, B> {
    pub fn new(backend: &'a B, config: &'a CmsConfig) -> Self {
        Self { backend, config }
    }

    /// Table definition a schema is stored in under the configured layout
    pub fn table_for(&self, schema: &ContentTypeSchema) -> CmsResult<TableDef> {
        match self.config.layout {
            StorageLayout::DedicatedTable => TableDef::for_schema(schema, self.config),
            StorageLayout::JsonColumn => Ok(TableDef::shared(self.config)),
        }
    }

    /// Create the schema's storage unless it already exists
    pub fn ensure_storage_exists(&self, schema: &ContentTypeSchema) -> CmsResult<Materialized> {
        let failed = |message: String| CmsError::Materialization {
            schema: schema.slug.clone(),
            message,
        };

        let table = self.table_for(schema)?;

        if self.backend.table_exists(&table.name).map_err(|e| failed(e.to_string()))? {
            tracing::debug!(content_type = %schema.slug, table = %table.name, "storage already exists");
            return Ok(Materialized::AlreadyExists);
        }

        match self.backend.create_table(&table) {
            Ok(()) => {
                tracing::info!(
                    content_type = %schema.slug,
                    table = %table.name,
                    columns = table.columns.len(),
                    "storage created"
                );
                Ok(Materialized::Created)
            }
            Err(CmsError::TableExists(name)) => {
                tracing::debug!(content_type = %schema.slug, table = %name, "storage created concurrently");
                Ok(Materialized::AlreadyExists)
            }
            Err(e) => Err(failed(e.to_string())),
        }
    }

    /// Materialize every registered schema, collecting failures
    pub fn materialize_all(&self, registry: &SealedRegistry) -> MaterializationReport {
        let mut report = MaterializationReport::default();

        for schema in registry.all() {
            match self.ensure_storage_exists(schema) {
                Ok(_) => report.servable.push(schema.slug.clone()),
                Err(e) => {
                    tracing::error!(content_type = %schema.slug, error = %e, "materialization failed");
                    report.failed.push((schema.slug.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            servable = report.servable.len(),
            failed = report.failed.len(),
            "materialization finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use brawo_core::{ContentStatus, EntityId};
    use brawo_schema::{ContentTypeRegistry, DynamicEntity, FieldDefinition};

    /// Backend that loses every race or refuses to create tables
    struct Flaky {
        inner: InMemoryStore,
        refuse: bool,
    }

    impl StorageBackend for Flaky {
        fn table_exists(&self, _table: &str) -> CmsResult<bool> {
            Ok(false)
        }

        fn create_table(&self, definition: &TableDef) -> CmsResult<()> {
            if self.refuse {
                return Err(CmsError::storage("permission denied"));
            }
            let _ = self.inner.create_table(definition);
            Err(CmsError::TableExists(definition.name.clone()))
        }

        fn insert(&self, table: &str, entity: &DynamicEntity) -> CmsResult<EntityId> {
            self.inner.insert(table, entity)
        }

        fn update(&self, table: &str, entity: &DynamicEntity) -> CmsResult<()> {
            self.inner.update(table, entity)
        }

        fn get(&self, table: &str, ct: &str, id: EntityId) -> CmsResult<Option<DynamicEntity>> {
            self.inner.get(table, ct, id)
        }

        fn find_by_slug(&self, table: &str, ct: &str, slug: &str) -> CmsResult<Option<DynamicEntity>> {
            self.inner.find_by_slug(table, ct, slug)
        }

        fn delete(&self, table: &str, ct: &str, id: EntityId) -> CmsResult<bool> {
            self.inner.delete(table, ct, id)
        }

        fn list(&self, table: &str, ct: &str, status: Option<ContentStatus>) -> CmsResult<Vec<DynamicEntity>> {
            self.inner.list(table, ct, status)
        }

        fn slug_exists(&self, table: &str, ct: &str, slug: &str, except: Option<EntityId>) -> CmsResult<bool> {
            self.inner.slug_exists(table, ct, slug, except)
        }
    }

    fn faq() -> ContentTypeSchema {
        ContentTypeSchema::new("faqs", "FAQs")
            .with_field(FieldDefinition::string("question").required())
            .with_field(FieldDefinition::new("answer", "textarea"))
    }

    #[test]
    fn test_ensure_storage_is_idempotent() {
        let store = InMemoryStore::new();
        let config = CmsConfig::default();
        let materializer = SchemaMaterializer::new(&store, &config);

        assert_eq!(materializer.ensure_storage_exists(&faq()).unwrap(), Materialized::Created);
        assert_eq!(
            materializer.ensure_storage_exists(&faq()).unwrap(),
            Materialized::AlreadyExists
        );
        assert_eq!(store.table_names().unwrap(), vec!["faqs"]);
    }

    #[test]
    fn test_concurrent_creation_is_swallowed() {
        let backend = Flaky {
            inner: InMemoryStore::new(),
            refuse: false,
        };
        let config = CmsConfig::default();
        let materializer = SchemaMaterializer::new(&backend, &config);

        assert_eq!(
            materializer.ensure_storage_exists(&faq()).unwrap(),
            Materialized::AlreadyExists
        );
    }

    #[test]
    fn test_failure_is_materialization_error() {
        let backend = Flaky {
            inner: InMemoryStore::new(),
            refuse: true,
        };
        let config = CmsConfig::default();
        let err = SchemaMaterializer::new(&backend, &config)
            .ensure_storage_exists(&faq())
            .unwrap_err();
        assert!(matches!(err, CmsError::Materialization { ref schema, .. } if schema == "faqs"));
    }

    #[test]
    fn test_json_layout_shares_one_table() {
        let store = InMemoryStore::new();
        let config = CmsConfig::default().with_layout(StorageLayout::JsonColumn);
        let materializer = SchemaMaterializer::new(&store, &config);

        let product = ContentTypeSchema::new("products", "Products")
            .with_field(FieldDefinition::string("title"));

        assert_eq!(materializer.ensure_storage_exists(&faq()).unwrap(), Materialized::Created);
        assert_eq!(
            materializer.ensure_storage_exists(&product).unwrap(),
            Materialized::AlreadyExists
        );
        assert_eq!(store.table_names().unwrap(), vec!["brawo_cms_contents"]);
    }

    #[test]
    fn test_materialize_all_reports_failures() {
        let mut registry = ContentTypeRegistry::new();
        registry.add(faq()).unwrap();
        registry
            .add(
                ContentTypeSchema::new("events", "Events")
                    .with_field(FieldDefinition::string("title"))
                    .with_field(FieldDefinition::select("status", ["Open", "Closed"])),
            )
            .unwrap();
        let registry = registry.seal().unwrap();

        let store = InMemoryStore::new();
        let config = CmsConfig::default();
        let report = SchemaMaterializer::new(&store, &config).materialize_all(&registry);

        assert!(report.is_servable("faqs"));
        assert!(!report.is_servable("events"));
        assert!(!report.is_complete());
        assert_eq!(report.failed[0].0, "events");
    }
}

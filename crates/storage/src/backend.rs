//! Storage seam
//!
//! Backends persist entities in named tables. With the JSON-column layout
//! several content types share one table, so lookups are scoped by content
//! type as well as by table.

use crate::ddl::TableDef;
use brawo_core::{CmsResult, ContentStatus, EntityId};
use brawo_schema::DynamicEntity;

/// Persistence operations the entity layer relies on
///
/// Implementations enforce slug uniqueness per content type: `insert` and
/// `update` report [`CmsError::SlugConflict`](brawo_core::CmsError::SlugConflict)
/// instead of storing a duplicate. `create_table` reports
/// [`CmsError::TableExists`](brawo_core::CmsError::TableExists) when the table
/// is already there.
pub trait StorageBackend: Send + Sync {
    fn table_exists(&self, table: &str) -> CmsResult<bool>;

    fn create_table(&self, definition: &TableDef) -> CmsResult<()>;

    /// Store a new entity and return its id
    fn insert(&self, table: &str, entity: &DynamicEntity) -> CmsResult<EntityId>;

    /// Overwrite a stored entity (matched by id)
    fn update(&self, table: &str, entity: &DynamicEntity) -> CmsResult<()>;

    fn get(&self, table: &str, content_type: &str, id: EntityId) -> CmsResult<Option<DynamicEntity>>;

    fn find_by_slug(
        &self,
        table: &str,
        content_type: &str,
        slug: &str,
    ) -> CmsResult<Option<DynamicEntity>>;

    /// Remove an entity, returning whether it existed
    fn delete(&self, table: &str, content_type: &str, id: EntityId) -> CmsResult<bool>;

    /// Entities in id order, optionally restricted to one status
    fn list(
        &self,
        table: &str,
        content_type: &str,
        status: Option<ContentStatus>,
    ) -> CmsResult<Vec<DynamicEntity>>;

    /// Whether another entity of the content type already uses the slug
    fn slug_exists(
        &self,
        table: &str,
        content_type: &str,
        slug: &str,
        except: Option<EntityId>,
    ) -> CmsResult<bool>;
}

//! In-memory storage backend

use crate::backend::StorageBackend;
use crate::ddl::TableDef;
use brawo_core::{CmsError, CmsResult, ContentStatus, EntityId};
use brawo_schema::DynamicEntity;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct MemoryTable {
    definition: TableDef,
    rows: BTreeMap<EntityId, DynamicEntity>,
    next_id: EntityId,
}

impl MemoryTable {
    fn slug_taken(&self, content_type: &str, slug: &str, except: Option<EntityId>) -> bool {
        self.rows.values().any(|row| {
            row.content_type == content_type && row.slug == slug && row.id != except
        })
    }

    fn scoped(&self, content_type: &str, id: EntityId) -> Option<&DynamicEntity> {
        self.rows
            .get(&id)
            .filter(|row| row.content_type == content_type)
    }
}

/// Backend keeping every table in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Definition a table was created with
    pub fn table_definition(&self, table: &str) -> CmsResult<Option<TableDef>> {
        Ok(self.read()?.get(table).map(|t| t.definition.clone()))
    }

    /// Names of the existing tables, sorted
    pub fn table_names(&self) -> CmsResult<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read(&self) -> CmsResult<RwLockReadGuard<'_, HashMap<String, MemoryTable>>> {
        self.tables
            .read()
            .map_err(|_| CmsError::storage("in-memory store lock poisoned"))
    }

    fn write(&self) -> CmsResult<RwLockWriteGuard<'_, HashMap<String, MemoryTable>>> {
        self.tables
            .write()
            .map_err(|_| CmsError::storage("in-memory store lock poisoned"))
    }
}

fn missing_table(table: &str) -> CmsError {
    CmsError::storage(format!("table '{}' does not exist", table))
}

impl StorageBackend for InMemoryStore {
    fn table_exists(&self, table: &str) -> CmsResult<bool> {
        Ok(self.read()?.contains_key(table))
    }

    fn create_table(&self, definition: &TableDef) -> CmsResult<()> {
        let mut tables = self.write()?;
        if tables.contains_key(&definition.name) {
            return Err(CmsError::TableExists(definition.name.clone()));
        }

        tables.insert(
            definition.name.clone(),
            MemoryTable {
                definition: definition.clone(),
                rows: BTreeMap::new(),
                next_id: 1,
            },
        );
        Ok(())
    }

    fn insert(&self, table: &str, entity: &DynamicEntity) -> CmsResult<EntityId> {
        let mut tables = self.write()?;
        let store = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        if store.slug_taken(&entity.content_type, &entity.slug, None) {
            return Err(CmsError::SlugConflict {
                schema: entity.content_type.clone(),
                slug: entity.slug.clone(),
            });
        }

        let id = store.next_id;
        store.next_id += 1;

        let mut row = entity.clone();
        row.id = Some(id);
        store.rows.insert(id, row);
        Ok(id)
    }

    fn update(&self, table: &str, entity: &DynamicEntity) -> CmsResult<()> {
        let mut tables = self.write()?;
        let store = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let id = entity
            .id
            .ok_or_else(|| CmsError::storage("cannot update an entity without an id"))?;

        if store.scoped(&entity.content_type, id).is_none() {
            return Err(CmsError::EntityNotFound {
                schema: entity.content_type.clone(),
                id,
            });
        }
        if store.slug_taken(&entity.content_type, &entity.slug, Some(id)) {
            return Err(CmsError::SlugConflict {
                schema: entity.content_type.clone(),
                slug: entity.slug.clone(),
            });
        }

        store.rows.insert(id, entity.clone());
        Ok(())
    }

    fn get(&self, table: &str, content_type: &str, id: EntityId) -> CmsResult<Option<DynamicEntity>> {
        let tables = self.read()?;
        let store = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(store.scoped(content_type, id).cloned())
    }

    fn find_by_slug(
        &self,
        table: &str,
        content_type: &str,
        slug: &str,
    ) -> CmsResult<Option<DynamicEntity>> {
        let tables = self.read()?;
        let store = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(store
            .rows
            .values()
            .find(|row| row.content_type == content_type && row.slug == slug)
            .cloned())
    }

    fn delete(&self, table: &str, content_type: &str, id: EntityId) -> CmsResult<bool> {
        let mut tables = self.write()?;
        let store = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        if store.scoped(content_type, id).is_none() {
            return Ok(false);
        }
        Ok(store.rows.remove(&id).is_some())
    }

    fn list(
        &self,
        table: &str,
        content_type: &str,
        status: Option<ContentStatus>,
    ) -> CmsResult<Vec<DynamicEntity>> {
        let tables = self.read()?;
        let store = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(store
            .rows
            .values()
            .filter(|row| row.content_type == content_type)
            .filter(|row| status.is_none_or(|s| row.status == s))
            .cloned()
            .collect())
    }

    fn slug_exists(
        &self,
        table: &str,
        content_type: &str,
        slug: &str,
        except: Option<EntityId>,
    ) -> CmsResult<bool> {
        let tables = self.read()?;
        let store = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(store.slug_taken(content_type, slug, except))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CmsConfig;

    fn store_with_shared_table() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.create_table(&TableDef::shared(&CmsConfig::default())).unwrap();
        store
    }

    const TABLE: &str = "brawo_cms_contents";

    #[test]
    fn test_create_table_twice_reports_exists() {
        let store = store_with_shared_table();
        let err = store
            .create_table(&TableDef::shared(&CmsConfig::default()))
            .unwrap_err();
        assert!(matches!(err, CmsError::TableExists(name) if name == TABLE));
    }

    #[test]
    fn test_insert_assigns_ids() {
        let store = store_with_shared_table();
        let a = store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("a"))
            .unwrap();
        let b = store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("b"))
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.get(TABLE, "faqs", 2).unwrap().unwrap().slug, "b");
    }

    #[test]
    fn test_slug_unique_per_content_type() {
        let store = store_with_shared_table();
        store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("intro"))
            .unwrap();

        let err = store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("intro"))
            .unwrap_err();
        assert!(matches!(err, CmsError::SlugConflict { .. }));

        store
            .insert(TABLE, &DynamicEntity::new("products").with_slug("intro"))
            .unwrap();
    }

    #[test]
    fn test_scoped_reads() {
        let store = store_with_shared_table();
        let id = store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("intro"))
            .unwrap();

        assert!(store.get(TABLE, "products", id).unwrap().is_none());
        assert!(!store.delete(TABLE, "products", id).unwrap());
        assert!(store.delete(TABLE, "faqs", id).unwrap());
        assert!(store.list(TABLE, "faqs", None).unwrap().is_empty());
    }

    #[test]
    fn test_list_filters_status() {
        let store = store_with_shared_table();
        let mut published = DynamicEntity::new("faqs").with_slug("live");
        published.status = ContentStatus::Published;
        store.insert(TABLE, &published).unwrap();
        store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("wip"))
            .unwrap();

        let live = store
            .list(TABLE, "faqs", Some(ContentStatus::Published))
            .unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].slug, "live");
        assert_eq!(store.list(TABLE, "faqs", None).unwrap().len(), 2);
    }

    #[test]
    fn test_update_checks_existence_and_slug() {
        let store = store_with_shared_table();
        store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("one"))
            .unwrap();
        let id = store
            .insert(TABLE, &DynamicEntity::new("faqs").with_slug("two"))
            .unwrap();

        let mut entity = store.get(TABLE, "faqs", id).unwrap().unwrap();
        entity.slug = "one".to_string();
        assert!(matches!(
            store.update(TABLE, &entity).unwrap_err(),
            CmsError::SlugConflict { .. }
        ));

        entity.id = Some(99);
        assert!(store.update(TABLE, &entity).unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_table_is_storage_error() {
        let store = InMemoryStore::new();
        assert!(!store.table_exists("faqs").unwrap());
        assert!(store.list("faqs", "faqs", None).unwrap_err().is_storage());
    }
}

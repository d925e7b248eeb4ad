//! Entity lookup seam
//!
//! Taxonomy and reference fields resolve ids into entities through this
//! trait. Storage backends implement it; display and input code only ever
//! sees the trait.

use brawo_core::{CmsResult, EntityId};
use brawo_schema::DynamicEntity;
use serde_json::Value;

/// Read access to the entities of other content types
pub trait EntityLookup {
    /// Entities of a content type with the given ids (missing ids are skipped)
    fn find_by_ids(&self, content_type: &str, ids: &[EntityId]) -> CmsResult<Vec<DynamicEntity>>;

    /// Every entity of a content type
    fn all_of(&self, content_type: &str) -> CmsResult<Vec<DynamicEntity>>;
}

/// Lookup that knows no entities
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl EntityLookup for NoLookup {
    fn find_by_ids(&self, _content_type: &str, _ids: &[EntityId]) -> CmsResult<Vec<DynamicEntity>> {
        Ok(Vec::new())
    }

    fn all_of(&self, _content_type: &str) -> CmsResult<Vec<DynamicEntity>> {
        Ok(Vec::new())
    }
}

impl<T: EntityLookup + ?Sized> EntityLookup for &T {
    fn find_by_ids(&self, content_type: &str, ids: &[EntityId]) -> CmsResult<Vec<DynamicEntity>> {
        (**self).find_by_ids(content_type, ids)
    }

    fn all_of(&self, content_type: &str) -> CmsResult<Vec<DynamicEntity>> {
        (**self).all_of(content_type)
    }
}

fn text_field(entity: &DynamicEntity, name: &str) -> Option<String> {
    match entity.get_field(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Label of a referenced entity: its `title`, else its `name`, else its id
pub fn entity_label(entity: &DynamicEntity) -> String {
    text_field(entity, "title")
        .or_else(|| text_field(entity, "name"))
        .unwrap_or_else(|| entity.id.map(|id| id.to_string()).unwrap_or_default())
}

/// Name of a taxonomy entry (falls back like [`entity_label`])
pub fn taxonomy_name(entity: &DynamicEntity) -> String {
    text_field(entity, "name").unwrap_or_else(|| entity_label(entity))
}

/// Sort entities for a choice list
///
/// Entities with a `title` sort by title, otherwise by `name`, otherwise by id.
pub fn sort_for_choices(entities: &mut [DynamicEntity]) {
    let has_title = entities.iter().any(|e| text_field(e, "title").is_some());
    let has_name = entities.iter().any(|e| text_field(e, "name").is_some());

    if has_title {
        entities.sort_by_cached_key(|e| (text_field(e, "title").unwrap_or_default(), e.id));
    } else if has_name {
        entities.sort_by_cached_key(|e| (text_field(e, "name").unwrap_or_default(), e.id));
    } else {
        entities.sort_by_key(|e| e.id);
    }
}

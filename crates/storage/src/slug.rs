//! Slug generation
//!
//! Slugs are derived from the title-like field with `parameterize`. On a
//! collision the next candidate carries a numeric suffix (`-1`, `-2`, ...)
//! up to the configured attempt limit.

use brawo_core::{CmsError, CmsResult};
use brawo_schema::naming::{parameterize, singularize};
use brawo_schema::{ContentTypeSchema, DynamicEntity};

/// Base slug of an entity
///
/// An explicit slug wins, then the title-like field. Entities without
/// either fall back to the singular content type slug.
pub fn base_slug(schema: &ContentTypeSchema, entity: &DynamicEntity) -> String {
    [
        Some(entity.slug.clone()),
        entity.title(schema),
    ]
    .into_iter()
    .flatten()
    .map(|text| parameterize(&text))
    .find(|slug| !slug.is_empty())
    .unwrap_or_else(|| parameterize(&singularize(&schema.slug)))
}

/// Candidate slugs in the order they are tried: `base`, `base-1`, ... `base-max`
pub fn candidates(base: &str, max_attempts: u32) -> impl Iterator<Item = String> + '_ {
    (0..=max_attempts).map(move |attempt| match attempt {
        0 => base.to_string(),
        n => format!("{}-{}", base, n),
    })
}

/// First candidate not taken
pub fn first_available(
    base: &str,
    max_attempts: u32,
    mut taken: impl FnMut(&str) -> CmsResult<bool>,
) -> CmsResult<String> {
    for candidate in candidates(base, max_attempts) {
        if !taken(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(CmsError::SlugExhausted {
        base: base.to_string(),
        attempts: max_attempts,
    })
}

//! # Brawo Schema
//!
//! Declarative content type schemas and the registry that holds them.
//!
//! ## Core Concepts
//!
//! - **FieldDefinition**: one declared field (name, type tag, options)
//! - **ContentTypeSchema**: ordered field list plus slug, display name and routes
//! - **DynamicEntity**: a stored record whose values live in a JSON map
//! - **ContentTypeRegistry**: slug -> schema, sealed into a `SealedRegistry`
//! - **RouteDescriptor**: archive and single-entity URL patterns
//!

pub mod content_type;
pub mod discovery;
pub mod entity;
pub mod field;
pub mod naming;
pub mod registry;
pub mod route;
pub mod validation;

pub use content_type::{ContentTypeSchema, SchemaDeclaration};
pub use discovery::{discover_declarations, load_registry, load_schema_file, save_schema_file};
pub use entity::{DynamicEntity, ids_to_value, is_blank, reference_ids, try_reference_ids};
pub use field::{Choice, FieldDefinition};
pub use registry::{ContentTypeRegistry, SealedRegistry};
pub use route::{Route, RouteAction, RouteDescriptor};
pub use validation::{ValidationResult, ValidationRule, Validator};

pub use brawo_core::{CmsError, CmsResult, ContentStatus, EntityId, FieldType, SchemaKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        CmsError, CmsResult, ContentStatus, ContentTypeRegistry, ContentTypeSchema,
        DynamicEntity, EntityId, FieldDefinition, FieldType, RouteDescriptor, SealedRegistry,
    };
}

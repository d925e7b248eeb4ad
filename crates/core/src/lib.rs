//! # Brawo Core
//!
//! Core types, traits, and error handling for Brawo CMS.
//!
//! This crate provides the foundational building blocks used by the schema,
//! field and storage crates:
//!
//! - **Types**: field type tags, content status, schema kind, database dialect
//! - **Traits**: common behaviours like `Validatable` and `Named`
//! - **Errors**: unified error handling with `CmsError` and `CmsResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CmsError, CmsResult, FieldError, ResultExt, ValidationErrors};
pub use traits::{Named, Timestamped, Validatable};
pub use types::{ContentStatus, DatabaseType, EntityId, FieldType, SchemaKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! # Brawo Storage
//!
//! Storage for content types declared through `brawo_schema`.
//!
//! ## Core Concepts
//!
//! - **CmsConfig**: database dialect, storage layout and naming options
//! - **TableDef**: storage shape of a schema, rendered as DDL per dialect
//! - **StorageBackend**: persistence seam; [`InMemoryStore`] is the reference backend
//! - **SchemaMaterializer**: makes sure storage exists for every content type
//! - **ContentRepository**: create, update, publish and archive flows
//!
//! ## Example
//!
//! ```rust,ignore
//! use brawo_storage::{CmsConfig, ContentRepository, InMemoryStore, SchemaMaterializer};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let config = CmsConfig::default();
//! let report = SchemaMaterializer::new(store.as_ref(), &config).materialize_all(&registry);
//! let repo = ContentRepository::new(store, Arc::new(registry), config);
//! let post = repo.create("blog_posts", &params)?;
//! ```

pub mod backend;
pub mod config;
pub mod ddl;
pub mod materializer;
pub mod memory;
pub mod repository;
pub mod slug;

pub use backend::StorageBackend;
pub use config::{CmsConfig, StorageLayout};
pub use ddl::{ColumnDef, ColumnType, IndexDef, TableDef};
pub use materializer::{MaterializationReport, Materialized, SchemaMaterializer};
pub use memory::InMemoryStore;
pub use repository::ContentRepository;

//! # Brawo Fields
//!
//! Per-type field strategies: reading stored values, formatting them for
//! display, describing form inputs and normalizing submissions.
//!
//! Type tags are resolved through a [`FieldTypeRegistry`]; tags nobody
//! registered behave as plain strings. Taxonomy and reference fields resolve
//! ids through the [`EntityLookup`] seam, which storage backends implement.

pub mod display;
pub mod field;
pub mod form;
pub mod input;
pub mod lookup;
pub mod normalize;
pub mod registry;

pub use field::Field;
pub use form::{DisplayRow, SchemaForm};
pub use input::{InputKind, InputSpec, RepeaterRow, RepeaterSpec, SelectOption, INDEX_PLACEHOLDER};
pub use lookup::{entity_label, sort_for_choices, taxonomy_name, EntityLookup, NoLookup};
pub use registry::{FieldKind, FieldTypeRegistry};

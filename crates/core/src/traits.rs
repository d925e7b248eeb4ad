//! Core traits for Brawo CMS
//!
//! This module defines the behaviours shared by schema declarations,
//! entities and configuration: self-validation, naming and timestamps.

use crate::error::CmsResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use brawo_core::{CmsError, CmsResult, Validatable};
///
/// struct Route {
///     pattern: String,
/// }
///
/// impl Validatable for Route {
///     fn validate(&self) -> CmsResult<()> {
///         if !self.pattern.contains(":slug") {
///             return Err(CmsError::validation("Pattern needs a :slug placeholder"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `CmsError` describing the problem.
    fn validate(&self) -> CmsResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types that have a machine name and a human label
pub trait Named {
    /// Get the machine name (identifier or slug)
    fn name(&self) -> &str;

    /// Get the human-readable label
    fn label(&self) -> String;

    /// Check if the name matches (case-insensitive)
    fn name_matches(&self, other: &str) -> bool {
        self.name().eq_ignore_ascii_case(other)
    }
}

// ============================================================================
// Timestamped Trait
// ============================================================================

/// Trait for types that track creation and modification times
pub trait Timestamped {
    /// Get the creation timestamp
    fn created_at(&self) -> chrono::DateTime<chrono::Utc>;

    /// Get the last modification timestamp
    fn updated_at(&self) -> chrono::DateTime<chrono::Utc>;

    /// Update the modification timestamp to now
    fn touch(&mut self);
}

// ============================================================================
// Tests
// ============================================================================

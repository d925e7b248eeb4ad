//! Cross-schema validation rules
//!
//! Each schema validates itself through `Validatable`. The rules here look
//! at the registry as a whole: taxonomy and reference targets, route
//! collisions and schemas that cannot derive slugs.

use crate::content_type::ContentTypeSchema;
use crate::field::FieldDefinition;
use crate::registry::ContentTypeRegistry;
use brawo_core::{CmsError, CmsResult, FieldType, Validatable};
use std::collections::HashMap;

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a failed validation result with an error
    pub fn error(error: ValidationError) -> Self {
        Self {
            valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert to CmsResult (fails if any errors)
    pub fn to_result(self) -> CmsResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(CmsError::validation(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Path to the problematic element (e.g. "faqs.fields.category")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Error codes for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    InvalidSchema,
    MissingTaxonomyType,
    MissingReferenceTarget,
    DuplicateRoutePath,
    DuplicateRouteName,
    DuplicateTableName,
}

// ============================================================================
// ValidationWarning
// ============================================================================

/// A validation warning (non-fatal issue)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub code: ValidationWarningCode,
    pub message: String,
    pub path: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] Warning: {}", path, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    NoFields,
    NoTitleField,
    DanglingTaxonomy,
    DanglingReference,
    UnknownFieldType,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// A check run over the whole registry
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn validate(&self, registry: &ContentTypeRegistry) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Registry validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(SchemaShapeRule));
        validator.add_rule(Box::new(FieldTargetsRule));
        validator.add_rule(Box::new(RouteCollisionRule));
        validator.add_rule(Box::new(TableCollisionRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the configured rules, in run order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate a registry with all rules
    pub fn validate(&self, registry: &ContentTypeRegistry) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for rule in &self.rules {
            result.merge(rule.validate(registry));
        }

        result
    }

    /// Validate and return Result
    pub fn validate_result(&self, registry: &ContentTypeRegistry) -> CmsResult<()> {
        self.validate(registry).to_result()
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: every schema is internally consistent
pub struct SchemaShapeRule;

impl ValidationRule for SchemaShapeRule {
    fn name(&self) -> &'static str {
        "schema_shape"
    }

    fn description(&self) -> &'static str {
        "Validates each schema's slug, fields and routes"
    }

    fn validate(&self, registry: &ContentTypeRegistry) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for schema in registry.all() {
            if let Err(e) = schema.validate() {
                result.add_error(
                    ValidationError::new(ValidationErrorCode::InvalidSchema, e.to_string())
                        .with_path(&schema.slug),
                );
                continue;
            }

            if schema.fields().is_empty() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::NoFields,
                        format!("Content type '{}' declares no fields", schema.slug),
                    )
                    .with_path(&schema.slug),
                );
            }

            if schema.routes.single_pattern.is_some() && schema.title_field_name().is_none() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::NoTitleField,
                        format!(
                            "Content type '{}' has single pages but no title field; slugs must be supplied",
                            schema.slug
                        ),
                    )
                    .with_path(&schema.slug),
                );
            }

            for field in schema.fields() {
                if field.field_type.is_unknown() {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::UnknownFieldType,
                            format!(
                                "Field type '{}' is not known and will behave as a string",
                                field.field_type
                            ),
                        )
                        .with_path(field_path(schema, field)),
                    );
                }
            }
        }

        result
    }
}

/// Rule: taxonomy and reference fields point at registered schemas
pub struct FieldTargetsRule;

impl FieldTargetsRule {
    fn check_field(
        registry: &ContentTypeRegistry,
        path: String,
        field: &FieldDefinition,
        result: &mut ValidationResult,
    ) {
        match field.field_type {
            FieldType::Taxonomy => match &field.taxonomy_type {
                None => result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::MissingTaxonomyType,
                        format!("Taxonomy field '{}' has no taxonomy_type", field.name),
                    )
                    .with_path(path),
                ),
                Some(target) => match registry.find(target) {
                    Some(schema) if schema.is_taxonomy() => {}
                    _ => result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::DanglingTaxonomy,
                            format!("Taxonomy '{}' is not registered", target),
                        )
                        .with_path(path),
                    ),
                },
            },
            FieldType::Reference | FieldType::BelongsTo => match &field.target_schema {
                None => result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::MissingReferenceTarget,
                        format!("Reference field '{}' has no target_schema", field.name),
                    )
                    .with_path(path),
                ),
                Some(target) if registry.find(target).is_none() => result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::DanglingReference,
                        format!("Reference target '{}' is not registered", target),
                    )
                    .with_path(path),
                ),
                Some(_) => {}
            },
            FieldType::Repeater => {
                for sub in &field.sub_fields {
                    Self::check_field(registry, format!("{}.{}", path, sub.name), sub, result);
                }
            }
            _ => {}
        }
    }
}

impl ValidationRule for FieldTargetsRule {
    fn name(&self) -> &'static str {
        "field_targets"
    }

    fn description(&self) -> &'static str {
        "Validates that taxonomy and reference fields name registered schemas"
    }

    fn validate(&self, registry: &ContentTypeRegistry) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for schema in registry.all() {
            for field in schema.fields() {
                Self::check_field(registry, field_path(schema, field), field, &mut result);
            }
        }

        result
    }
}

/// Rule: no two schemas claim the same route path or route name
pub struct RouteCollisionRule;

impl ValidationRule for RouteCollisionRule {
    fn name(&self) -> &'static str {
        "route_collisions"
    }

    fn description(&self) -> &'static str {
        "Validates that route paths and names are unique across content types"
    }

    fn validate(&self, registry: &ContentTypeRegistry) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut paths: HashMap<String, String> = HashMap::new();
        let mut names: HashMap<String, String> = HashMap::new();

        for schema in registry.all() {
            for route in schema.route_table() {
                if let Some(owner) = paths.insert(route.path.clone(), schema.slug.clone()) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateRoutePath,
                            format!("Route path '{}' is already used by '{}'", route.path, owner),
                        )
                        .with_path(format!("{}.routes", schema.slug)),
                    );
                }
                if let Some(owner) = names.insert(route.name.clone(), schema.slug.clone()) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateRouteName,
                            format!("Route name '{}' is already used by '{}'", route.name, owner),
                        )
                        .with_path(format!("{}.routes", schema.slug)),
                    );
                }
            }
        }

        result
    }
}

/// Rule: no two schemas derive the same table name
///
/// `team-members` and `team_members`, or `product` and `products`, would
/// otherwise share one dedicated table. The prefix applies to every table
/// alike, so names are compared without it.
pub struct TableCollisionRule;

impl ValidationRule for TableCollisionRule {
    fn name(&self) -> &'static str {
        "table_collisions"
    }

    fn description(&self) -> &'static str {
        "Validates that every content type derives its own table name"
    }

    fn validate(&self, registry: &ContentTypeRegistry) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut tables: HashMap<String, String> = HashMap::new();

        for schema in registry.all() {
            let table = schema.table_name("");
            if let Some(owner) = tables.insert(table.clone(), schema.slug.clone()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateTableName,
                        format!("Table '{}' is already derived from '{}'", table, owner),
                    )
                    .with_path(&schema.slug),
                );
            }
        }

        result
    }
}

fn field_path(schema: &ContentTypeSchema, field: &FieldDefinition) -> String {
    format!("{}.fields.{}", schema.slug, field.name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteDescriptor;

    fn registry_with(schemas: Vec<ContentTypeSchema>) -> ContentTypeRegistry {
        let mut registry = ContentTypeRegistry::new();
        for schema in schemas {
            let slug = schema.slug.clone();
            registry.register(slug, schema).unwrap();
        }
        registry
    }

    #[test]
    fn test_validation_result_merge() {
        let mut result = ValidationResult::ok();
        result.merge(ValidationResult::error(ValidationError::new(
            ValidationErrorCode::InvalidSchema,
            "Error",
        )));
        assert!(!result.valid);
        assert!(result.has_errors());
        assert!(result.to_result().is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::new(ValidationErrorCode::InvalidSchema, "Slug is empty")
            .with_path("faqs");
        assert_eq!(error.to_string(), "[faqs] Slug is empty");
    }

    #[test]
    fn test_dangling_taxonomy_is_warning() {
        let registry = registry_with(vec![ContentTypeSchema::new("posts", "Post")
            .with_field(FieldDefinition::string("title"))
            .with_field(FieldDefinition::taxonomy("category_id", "categories"))]);

        let result = Validator::with_default_rules().validate(&registry);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == ValidationWarningCode::DanglingTaxonomy));
    }

    #[test]
    fn test_taxonomy_target_must_be_taxonomy_kind() {
        let registry = registry_with(vec![
            ContentTypeSchema::new("categories", "Category").with_field(FieldDefinition::string("name")),
            ContentTypeSchema::new("posts", "Post")
                .with_field(FieldDefinition::taxonomy("category_id", "categories")),
        ]);

        let result = FieldTargetsRule.validate(&registry);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == ValidationWarningCode::DanglingTaxonomy));
    }

    #[test]
    fn test_reference_without_target_is_error() {
        let registry = registry_with(vec![ContentTypeSchema::new("posts", "Post")
            .with_field(FieldDefinition::new("related_ids", "reference"))]);

        let result = FieldTargetsRule.validate(&registry);
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, ValidationErrorCode::MissingReferenceTarget);
    }

    #[test]
    fn test_nested_reference_targets_checked() {
        let registry = registry_with(vec![ContentTypeSchema::new("products", "Product")
            .with_field(FieldDefinition::repeater(
                "bundles",
                vec![FieldDefinition::reference("item_ids", "widgets")],
            ))]);

        let result = FieldTargetsRule.validate(&registry);
        assert_eq!(
            result.warnings[0].path.as_deref(),
            Some("products.fields.bundles.item_ids")
        );
    }

    #[test]
    fn test_route_collisions() {
        let routes = RouteDescriptor::new().with_archive("/news");
        let registry = registry_with(vec![
            ContentTypeSchema::new("posts", "Post").with_routes(routes.clone()),
            ContentTypeSchema::new("articles", "Article").with_routes(routes),
        ]);

        let result = RouteCollisionRule.validate(&registry);
        assert!(result
            .errors
            .iter()
            .any(|e| e.code == ValidationErrorCode::DuplicateRoutePath));
    }

    #[test]
    fn test_unknown_type_warning() {
        let registry = registry_with(vec![ContentTypeSchema::new("posts", "Post")
            .with_field(FieldDefinition::new("swatch", "color"))]);

        let result = SchemaShapeRule.validate(&registry);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == ValidationWarningCode::UnknownFieldType));
    }

    #[test]
    fn test_default_rule_names() {
        assert_eq!(
            Validator::with_default_rules().rule_names(),
            vec!["schema_shape", "field_targets", "route_collisions", "table_collisions"]
        );
    }

    #[test]
    fn test_table_collisions() {
        let registry = registry_with(vec![
            ContentTypeSchema::new("team-members", "Team").with_field(FieldDefinition::string("name")),
            ContentTypeSchema::new("team_members", "Staff")
                .with_field(FieldDefinition::decimal("salary", 10, 2)),
            ContentTypeSchema::new("product", "Product").with_field(FieldDefinition::string("title")),
            ContentTypeSchema::new("products", "Products").with_field(FieldDefinition::string("title")),
        ]);

        let result = TableCollisionRule.validate(&registry);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].code, ValidationErrorCode::DuplicateTableName);
        assert_eq!(result.errors[0].path.as_deref(), Some("team_members"));
        assert_eq!(result.errors[1].path.as_deref(), Some("products"));

        assert!(registry.seal().is_err());
    }

    #[test]
    fn test_distinct_tables_pass() {
        let registry = registry_with(vec![
            ContentTypeSchema::new("faqs", "FAQ"),
            ContentTypeSchema::taxonomy("categories", "Categories"),
        ]);

        assert!(TableCollisionRule.validate(&registry).valid);
    }
}

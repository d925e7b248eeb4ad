//! Field strategies
//!
//! A [`Field`] pairs a definition with its resolved [`FieldKind`] and knows
//! how to read, display, describe and validate values of that field.
//! Display never fails: formatting problems are logged and the raw value is
//! shown instead.

use crate::display::{self, BLANK, NO, YES};
use crate::input::{InputKind, InputSpec, RepeaterRow, RepeaterSpec, SelectOption, INDEX_PLACEHOLDER};
use crate::lookup::{entity_label, sort_for_choices, taxonomy_name, EntityLookup};
use crate::normalize;
use crate::registry::FieldKind;
use brawo_core::{FieldError, FieldType, ValidationErrors};
use brawo_schema::entity::parse_reference_id;
use brawo_schema::{
    ids_to_value, is_blank, reference_ids, try_reference_ids, DynamicEntity, FieldDefinition,
};
use serde_json::{Map, Value};

/// Rows shown by text areas
pub const TEXTAREA_ROWS: &str = "5";

/// Largest `size` given to multi-selects
pub const MAX_MULTI_SELECT_SIZE: usize = 10;

// ============================================================================
// Field
// ============================================================================

/// Strategy for one field of a schema
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    definition: FieldDefinition,
    sub_fields: Vec<Field>,
}

impl Field {
    pub fn new(kind: FieldKind, definition: FieldDefinition, sub_fields: Vec<Field>) -> Self {
        Self {
            kind,
            definition,
            sub_fields,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn label(&self) -> String {
        self.definition.display_label()
    }

    pub fn is_required(&self) -> bool {
        self.definition.required
    }

    /// Strategies of a repeater's sub-fields
    pub fn sub_fields(&self) -> &[Field] {
        &self.sub_fields
    }

    fn is_decimal(&self) -> bool {
        self.definition.field_type == FieldType::Decimal || self.definition.scale.is_some()
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Stored value of this field (reference fields always as an id array)
    pub fn get_value(&self, entity: &DynamicEntity) -> Value {
        let raw = entity.get_field(self.name());
        match self.kind {
            FieldKind::Reference => ids_to_value(&reference_ids(raw)),
            _ => raw.cloned().unwrap_or(Value::Null),
        }
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Display string of this field's value on an entity
    pub fn format_for_display(&self, entity: &DynamicEntity, lookup: &dyn EntityLookup) -> String {
        self.format_value(&self.get_value(entity), lookup)
    }

    /// Display string of a value; falls back to the raw value on error
    pub fn format_value(&self, value: &Value, lookup: &dyn EntityLookup) -> String {
        match self.try_format(value, lookup) {
            Ok(text) => text,
            Err(message) => {
                tracing::warn!(
                    field = %self.name(),
                    error = %message,
                    "could not format value, showing raw value"
                );
                display::raw_text(value)
            }
        }
    }

    fn try_format(&self, value: &Value, lookup: &dyn EntityLookup) -> Result<String, String> {
        match self.kind {
            FieldKind::Boolean => Ok(if display::is_truthy(value) { YES } else { NO }.to_string()),
            _ if is_blank(value) => Ok(BLANK.to_string()),
            FieldKind::String | FieldKind::Text => Ok(display::raw_text(value)),
            FieldKind::Number => self.format_number(value),
            FieldKind::Date => display::format_date(value),
            FieldKind::DateTime => display::format_datetime(value),
            FieldKind::Select => {
                let raw = display::raw_text(value);
                Ok(self
                    .definition
                    .choice_label(&raw)
                    .map(str::to_string)
                    .unwrap_or(raw))
            }
            FieldKind::Taxonomy => self.format_taxonomy(value, lookup),
            FieldKind::Reference => self.format_reference(value, lookup),
            FieldKind::Repeater => self.format_rows(value, lookup),
        }
    }

    fn format_number(&self, value: &Value) -> Result<String, String> {
        let number = display::as_f64(value).ok_or_else(|| format!("{} is not a number", value))?;

        match (self.is_decimal(), self.definition.scale) {
            (true, Some(scale)) => Ok(format!("{:.*}", scale as usize, number)),
            _ => Ok(match value {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            }),
        }
    }

    fn format_taxonomy(&self, value: &Value, lookup: &dyn EntityLookup) -> Result<String, String> {
        let Some(taxonomy) = &self.definition.taxonomy_type else {
            return Ok(display::raw_text(value));
        };

        let Some(id) = parse_reference_id(value)? else {
            return Ok(BLANK.to_string());
        };

        let found = lookup
            .find_by_ids(taxonomy, &[id])
            .map_err(|e| e.to_string())?;

        Ok(found
            .iter()
            .find(|entry| entry.id == Some(id))
            .map(taxonomy_name)
            .unwrap_or_else(|| BLANK.to_string()))
    }

    fn format_reference(&self, value: &Value, lookup: &dyn EntityLookup) -> Result<String, String> {
        let ids = try_reference_ids(Some(value))?;
        if ids.is_empty() {
            return Ok(BLANK.to_string());
        }

        let Some(target) = &self.definition.target_schema else {
            return Ok(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", "));
        };

        let found = lookup.find_by_ids(target, &ids).map_err(|e| e.to_string())?;
        let labels: Vec<String> = ids
            .iter()
            .filter_map(|id| found.iter().find(|e| e.id == Some(*id)))
            .map(entity_label)
            .collect();

        if labels.is_empty() {
            Ok(BLANK.to_string())
        } else {
            Ok(labels.join(", "))
        }
    }

    fn format_rows(&self, value: &Value, lookup: &dyn EntityLookup) -> Result<String, String> {
        let rows = normalize::collect_rows(value)?;
        if rows.is_empty() {
            return Ok(BLANK.to_string());
        }

        let rendered: Vec<String> = rows
            .iter()
            .map(|row| {
                self.sub_fields
                    .iter()
                    .map(|sub| {
                        let value = row.get(sub.name()).unwrap_or(&Value::Null);
                        format!("{}: {}", sub.label(), sub.format_value(value, lookup))
                    })
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect();

        Ok(rendered.join("\n"))
    }

    // ========================================================================
    // Input description
    // ========================================================================

    /// Input description for the field's current value
    pub fn describe_input(&self, current: &Value, lookup: &dyn EntityLookup) -> InputSpec {
        self.describe_input_named(self.name(), current, lookup)
    }

    /// Input description under an explicit parameter name
    pub fn describe_input_named(
        &self,
        name: &str,
        current: &Value,
        lookup: &dyn EntityLookup,
    ) -> InputSpec {
        let mut spec = match self.kind {
            FieldKind::String => self.text_input(name, current),
            FieldKind::Text => self
                .text_input(name, current)
                .with_attribute("rows", TEXTAREA_ROWS),
            FieldKind::Number => self.number_input(name, current),
            FieldKind::Boolean => {
                let mut spec = self.base_input(InputKind::Checkbox, name);
                spec.value = Some(Value::Bool(display::is_truthy(current)));
                spec
            }
            FieldKind::Date => {
                let mut spec = self.base_input(InputKind::Date, name);
                spec.value = current
                    .as_str()
                    .and_then(display::parse_date)
                    .map(|d| Value::String(d.format(display::STORED_DATE_FORMAT).to_string()))
                    .or_else(|| non_null(current));
                spec
            }
            FieldKind::DateTime => {
                let mut spec = self.base_input(InputKind::DateTime, name);
                spec.value = current
                    .as_str()
                    .and_then(display::parse_datetime)
                    .map(|dt| Value::String(dt.format(display::INPUT_DATETIME_FORMAT).to_string()))
                    .or_else(|| non_null(current));
                spec
            }
            FieldKind::Select => self.select_input(name, current),
            FieldKind::Taxonomy => self.taxonomy_input(name, current, lookup),
            FieldKind::Reference => self.reference_input(name, current, lookup),
            FieldKind::Repeater => self.repeater_input(name, current, lookup),
        };

        spec.attributes.extend(
            self.definition
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        spec
    }

    fn base_input(&self, kind: InputKind, name: &str) -> InputSpec {
        let mut spec = InputSpec::new(kind, name, self.label());
        spec.required = self.definition.required;
        spec.help_text = self.definition.help_text.clone();
        spec.placeholder = self.definition.placeholder.clone();
        spec
    }

    fn text_input(&self, name: &str, current: &Value) -> InputSpec {
        let kind = if self.kind == FieldKind::Text {
            InputKind::TextArea
        } else {
            InputKind::Text
        };
        let mut spec = self.base_input(kind, name);
        spec.value = non_null(current);
        spec
    }

    fn number_input(&self, name: &str, current: &Value) -> InputSpec {
        let step = match (self.is_decimal(), self.definition.scale) {
            (false, _) => "1".to_string(),
            (true, Some(0)) => "1".to_string(),
            (true, Some(scale)) => format!("0.{}1", "0".repeat(scale as usize - 1)),
            (true, None) => "any".to_string(),
        };
        let mut spec = self.base_input(InputKind::Number, name).with_attribute("step", step);
        spec.value = non_null(current);
        spec
    }

    fn blank_option(&self) -> Option<String> {
        (!self.definition.required).then(|| format!("Select {}", self.label()))
    }

    fn select_input(&self, name: &str, current: &Value) -> InputSpec {
        let selected = (!is_blank(current)).then(|| display::raw_text(current));

        let mut spec = self.base_input(InputKind::Select, name);
        spec.include_blank = self.blank_option();
        spec.options = self
            .definition
            .choices
            .iter()
            .map(|c| SelectOption::new(&c.label, &c.value, selected.as_deref() == Some(c.value.as_str())))
            .collect();
        spec
    }

    fn taxonomy_input(&self, name: &str, current: &Value, lookup: &dyn EntityLookup) -> InputSpec {
        let Some(taxonomy) = &self.definition.taxonomy_type else {
            return self.text_input(name, current);
        };

        let selected = parse_reference_id(current).ok().flatten();
        let mut entries = lookup.all_of(taxonomy).unwrap_or_else(|e| {
            tracing::warn!(field = %self.name(), taxonomy = %taxonomy, error = %e, "could not list taxonomy");
            Vec::new()
        });
        entries.sort_by_cached_key(|entry| (taxonomy_name(entry).to_lowercase(), entry.id));

        let mut spec = self.base_input(InputKind::Select, name);
        spec.include_blank = self.blank_option();
        spec.options = entries
            .iter()
            .filter_map(|entry| {
                entry.id.map(|id| {
                    SelectOption::new(taxonomy_name(entry), id.to_string(), selected == Some(id))
                })
            })
            .collect();
        spec
    }

    fn reference_input(&self, name: &str, current: &Value, lookup: &dyn EntityLookup) -> InputSpec {
        let Some(target) = &self.definition.target_schema else {
            return self.text_input(name, current);
        };

        let selected = reference_ids(Some(current));
        let mut entities = lookup.all_of(target).unwrap_or_else(|e| {
            tracing::warn!(field = %self.name(), target = %target, error = %e, "could not list references");
            Vec::new()
        });
        sort_for_choices(&mut entities);

        let mut spec = self.base_input(
            InputKind::MultiSelect,
            &format!("{}{}", name, normalize::MULTI_VALUE_SUFFIX),
        );
        spec.options = entities
            .iter()
            .filter_map(|entity| {
                entity.id.map(|id| {
                    SelectOption::new(entity_label(entity), id.to_string(), selected.contains(&id))
                })
            })
            .collect();

        if !spec.options.is_empty() {
            let size = spec.options.len().min(MAX_MULTI_SELECT_SIZE);
            spec = spec.with_attribute("size", size.to_string());
        }
        spec
    }

    fn repeater_input(&self, name: &str, current: &Value, lookup: &dyn EntityLookup) -> InputSpec {
        let rows = normalize::collect_rows(current).unwrap_or_else(|message| {
            tracing::warn!(field = %self.name(), error = %message, "ignoring malformed repeater rows");
            Vec::new()
        });

        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| RepeaterRow {
                index,
                fields: self.describe_row(name, &index.to_string(), Some(*row), lookup),
            })
            .collect();

        let mut spec = self.base_input(InputKind::Repeater, name);
        spec.repeater = Some(RepeaterSpec {
            rows,
            template: self.describe_row(name, INDEX_PLACEHOLDER, None, lookup),
            index_placeholder: INDEX_PLACEHOLDER.to_string(),
            removable: true,
            add_label: format!("Add {}", self.label()),
        });
        spec
    }

    fn describe_row(
        &self,
        name: &str,
        index: &str,
        row: Option<&Map<String, Value>>,
        lookup: &dyn EntityLookup,
    ) -> Vec<InputSpec> {
        self.sub_fields
            .iter()
            .map(|sub| {
                let value = row
                    .and_then(|r| r.get(sub.name()))
                    .unwrap_or(&Value::Null);
                let path = format!("{}[{}][{}]", name, index, sub.name());
                sub.describe_input_named(&path, value, lookup)
            })
            .collect()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Normalize a submitted value or report field-scoped errors
    ///
    /// Required-ness is not checked here; see `SchemaForm::check_publishable`.
    pub fn validate(&self, raw: &Value) -> Result<Value, ValidationErrors> {
        let result = match self.kind {
            FieldKind::String | FieldKind::Text => normalize::text(raw),
            FieldKind::Number => normalize::number(&self.definition, raw),
            FieldKind::Boolean => normalize::boolean(raw),
            FieldKind::Date => normalize::date(raw),
            FieldKind::DateTime => normalize::datetime(raw),
            FieldKind::Select => normalize::select(&self.definition, raw),
            FieldKind::Taxonomy => normalize::single_id(raw),
            FieldKind::Reference => normalize::reference(raw),
            FieldKind::Repeater => return self.validate_rows(raw),
        };

        result.map_err(|message| FieldError::new(self.name(), message).into())
    }

    fn validate_rows(&self, raw: &Value) -> Result<Value, ValidationErrors> {
        let rows = normalize::collect_rows(raw)
            .map_err(|message| ValidationErrors::from(FieldError::new(self.name(), message)))?;

        let mut normalized_rows = Vec::with_capacity(rows.len());
        let mut errors = ValidationErrors::new();

        for row in rows {
            let all_blank = self.sub_fields.iter().all(|sub| {
                normalize::submitted(row, sub.name())
                    .map_or(true, normalize::is_blank_submission)
            });
            if all_blank {
                continue;
            }

            let position = format!("{}[{}]", self.name(), normalized_rows.len());
            let mut normalized = Map::new();

            for sub in &self.sub_fields {
                let value = normalize::submitted(row, sub.name()).unwrap_or(&Value::Null);
                match sub.validate(value) {
                    Ok(v) => {
                        normalized.insert(sub.name().to_string(), v);
                    }
                    Err(sub_errors) => errors.extend(
                        sub_errors
                            .errors
                            .into_iter()
                            .map(|e| e.nested_under(&position)),
                    ),
                }
            }

            normalized_rows.push(Value::Object(normalized));
        }

        if errors.is_empty() {
            Ok(Value::Array(normalized_rows))
        } else {
            Err(errors)
        }
    }
}

fn non_null(value: &Value) -> Option<Value> {
    (!value.is_null()).then(|| value.clone())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::NoLookup;
    use crate::registry::FieldTypeRegistry;
    use brawo_core::{CmsResult, EntityId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Fixtures {
        entities: Vec<DynamicEntity>,
    }

    impl Fixtures {
        fn new() -> Self {
            let mk = |ct: &str, id: EntityId, field: &str, value: &str| {
                let mut e = DynamicEntity::new(ct).with_field(field, value);
                e.id = Some(id);
                e
            };
            Self {
                entities: vec![
                    mk("categories", 1, "name", "Technical"),
                    mk("categories", 2, "name", "Billing"),
                    mk("products", 3, "title", "Widget"),
                    mk("products", 7, "title", "Gadget"),
                    mk("products", 9, "title", "Anvil"),
                ],
            }
        }
    }

    impl EntityLookup for Fixtures {
        fn find_by_ids(&self, ct: &str, ids: &[EntityId]) -> CmsResult<Vec<DynamicEntity>> {
            Ok(self
                .entities
                .iter()
                .filter(|e| e.content_type == ct && e.id.is_some_and(|id| ids.contains(&id)))
                .cloned()
                .collect())
        }

        fn all_of(&self, ct: &str) -> CmsResult<Vec<DynamicEntity>> {
            Ok(self
                .entities
                .iter()
                .filter(|e| e.content_type == ct)
                .cloned()
                .collect())
        }
    }

    struct Broken;

    impl EntityLookup for Broken {
        fn find_by_ids(&self, _: &str, _: &[EntityId]) -> CmsResult<Vec<DynamicEntity>> {
            Err(brawo_core::CmsError::storage("connection lost"))
        }

        fn all_of(&self, _: &str) -> CmsResult<Vec<DynamicEntity>> {
            Err(brawo_core::CmsError::storage("connection lost"))
        }
    }

    fn build(def: FieldDefinition) -> Field {
        FieldTypeRegistry::new().build(&def)
    }

    fn features() -> Field {
        build(FieldDefinition::repeater(
            "features",
            vec![
                FieldDefinition::string("name"),
                FieldDefinition::decimal("price", 8, 2),
                FieldDefinition::reference("vendor_ids", "products"),
            ],
        ))
    }

    #[test]
    fn test_reference_get_value_is_always_array() {
        let field = build(FieldDefinition::reference("vendor_ids", "products"));
        let mut entity = DynamicEntity::new("posts");
        assert_eq!(field.get_value(&entity), json!([]));

        entity.set_field("vendor_ids", json!(null));
        assert_eq!(field.get_value(&entity), json!([]));

        entity.set_field("vendor_ids", json!(7));
        assert_eq!(field.get_value(&entity), json!([7]));
    }

    #[test]
    fn test_boolean_display() {
        let field = build(FieldDefinition::new("featured", "checkbox"));
        assert_eq!(field.format_value(&json!(true), &NoLookup), "✓ Yes");
        assert_eq!(field.format_value(&json!("0"), &NoLookup), "✗ No");
        assert_eq!(field.format_value(&json!(null), &NoLookup), "✗ No");
    }

    #[test]
    fn test_blank_displays_dash() {
        let field = build(FieldDefinition::string("subtitle"));
        assert_eq!(field.format_value(&json!(null), &NoLookup), "-");
        assert_eq!(field.format_value(&json!("  "), &NoLookup), "-");
        assert_eq!(field.format_value(&json!("Hi"), &NoLookup), "Hi");
    }

    #[test]
    fn test_date_display_never_mutates_and_degrades() {
        let field = build(FieldDefinition::new("launch", "date"));
        let entity = DynamicEntity::new("products").with_field("launch", "2025-01-03");

        assert_eq!(field.format_for_display(&entity, &NoLookup), "January 03, 2025");
        assert_eq!(entity.get_field("launch"), Some(&json!("2025-01-03")));
        assert_eq!(field.format_value(&json!("soon"), &NoLookup), "soon");
    }

    #[test]
    fn test_datetime_display() {
        let field = build(FieldDefinition::new("starts_at", "datetime"));
        assert_eq!(
            field.format_value(&json!("2025-01-03T14:30:00Z"), &NoLookup),
            "January 03, 2025 at 02:30 PM"
        );
    }

    #[test]
    fn test_number_display() {
        let price = build(FieldDefinition::decimal("price", 10, 2));
        assert_eq!(price.format_value(&json!(4.5), &NoLookup), "4.50");

        let order = build(FieldDefinition::new("display_order", "integer"));
        assert_eq!(order.format_value(&json!(0), &NoLookup), "0");
        assert_eq!(order.format_value(&json!("many"), &NoLookup), "many");
    }

    #[test]
    fn test_select_display_uses_choice_label() {
        let field = build(FieldDefinition::select("category", ["General"]).with_choice("Tech", "technical"));
        assert_eq!(field.format_value(&json!("technical"), &NoLookup), "Tech");
        assert_eq!(field.format_value(&json!("legacy"), &NoLookup), "legacy");
    }

    #[test]
    fn test_taxonomy_display() {
        let field = build(FieldDefinition::taxonomy("category_id", "categories"));
        let lookup = Fixtures::new();
        assert_eq!(field.format_value(&json!(2), &lookup), "Billing");
        assert_eq!(field.format_value(&json!("1"), &lookup), "Technical");
        assert_eq!(field.format_value(&json!(99), &lookup), "-");
        assert_eq!(field.format_value(&json!(2), &Broken), "2");
    }

    #[test]
    fn test_reference_display() {
        let field = build(FieldDefinition::reference("vendor_ids", "products"));
        let lookup = Fixtures::new();
        assert_eq!(field.format_value(&json!([7, 3]), &lookup), "Gadget, Widget");
        assert_eq!(field.format_value(&json!([3, 404]), &lookup), "Widget");
        assert_eq!(field.format_value(&json!([404]), &lookup), "-");
        assert_eq!(field.format_value(&json!([]), &lookup), "-");
    }

    #[test]
    fn test_repeater_display() {
        let field = features();
        let value = json!([
            {"name": "Fast", "price": 1.5, "vendor_ids": [3]},
            {"name": "Cheap", "price": null, "vendor_ids": []}
        ]);
        assert_eq!(
            field.format_value(&value, &Fixtures::new()),
            "Name: Fast | Price: 1.50 | Vendor Ids: Widget\nName: Cheap | Price: - | Vendor Ids: -"
        );
    }

    #[test]
    fn test_unknown_type_behaves_as_string() {
        let field = build(FieldDefinition::new("swatch", "color_picker"));
        let spec = field.describe_input(&json!("#fff"), &NoLookup);
        assert_eq!(spec.kind, InputKind::Text);
        assert_eq!(spec.value, Some(json!("#fff")));
        assert_eq!(field.format_value(&json!("#fff"), &NoLookup), "#fff");
        assert_eq!(field.validate(&json!("#000")).unwrap(), json!("#000"));
    }

    #[test]
    fn test_select_blank_option_rule() {
        let optional = build(FieldDefinition::select("category", ["General", "Billing"]));
        let spec = optional.describe_input(&json!("Billing"), &NoLookup);
        assert_eq!(spec.include_blank.as_deref(), Some("Select Category"));
        assert_eq!(spec.selected_values(), vec!["Billing"]);

        let required = build(FieldDefinition::select("category", ["General"]).required());
        assert_eq!(required.describe_input(&json!(null), &NoLookup).include_blank, None);
    }

    #[test]
    fn test_text_and_number_inputs() {
        let body = build(FieldDefinition::new("answer", "textarea").with_placeholder("Type here"));
        let spec = body.describe_input(&json!(null), &NoLookup);
        assert_eq!(spec.kind, InputKind::TextArea);
        assert_eq!(spec.attributes.get("rows").map(String::as_str), Some("5"));
        assert_eq!(spec.placeholder.as_deref(), Some("Type here"));
        assert_eq!(spec.value, None);

        let price = build(FieldDefinition::decimal("price", 10, 2).with_attribute("min", "0"));
        let spec = price.describe_input(&json!(3), &NoLookup);
        assert_eq!(spec.attributes.get("step").map(String::as_str), Some("0.01"));
        assert_eq!(spec.attributes.get("min").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_taxonomy_input_ordered_by_name() {
        let field = build(FieldDefinition::taxonomy("category_id", "categories"));
        let spec = field.describe_input(&json!(1), &Fixtures::new());

        assert_eq!(spec.kind, InputKind::Select);
        let labels: Vec<_> = spec.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Billing", "Technical"]);
        assert_eq!(spec.selected_values(), vec!["1"]);
        assert_eq!(spec.include_blank.as_deref(), Some("Select Category Id"));
    }

    #[test]
    fn test_reference_input_multi_select() {
        let field = build(FieldDefinition::reference("vendor_ids", "products"));
        let spec = field.describe_input(&json!([3, 9]), &Fixtures::new());

        assert!(spec.is_multiple());
        assert_eq!(spec.name, "vendor_ids[]");
        let labels: Vec<_> = spec.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Anvil", "Gadget", "Widget"]);
        assert_eq!(spec.selected_values(), vec!["9", "3"]);
        assert_eq!(spec.attributes.get("size").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_lookup_failure_gives_empty_options() {
        let field = build(FieldDefinition::reference("vendor_ids", "products"));
        let spec = field.describe_input(&json!([3]), &Broken);
        assert!(spec.options.is_empty());
    }

    #[test]
    fn test_repeater_input_rows_and_template() {
        let field = features();
        let spec = field.describe_input(
            &json!([{"name": "Fast", "price": 1.5, "vendor_ids": [3]}]),
            &NoLookup,
        );

        let repeater = spec.repeater.unwrap();
        assert!(repeater.removable);
        assert_eq!(repeater.rows.len(), 1);
        assert_eq!(repeater.rows[0].fields[0].name, "features[0][name]");
        assert_eq!(repeater.rows[0].fields[0].value, Some(json!("Fast")));
        assert_eq!(repeater.rows[0].fields[2].name, "features[0][vendor_ids][]");
        assert_eq!(repeater.template[0].name, "features[__INDEX__][name]");
        assert_eq!(repeater.template[0].value, None);
        assert_eq!(repeater.add_label, "Add Features");
    }

    #[test]
    fn test_reference_submission_compacts_blanks() {
        let field = build(FieldDefinition::reference("vendor_ids", "products"));
        assert_eq!(field.validate(&json!(["3", "7", ""])).unwrap(), json!([3, 7]));

        let err = field.validate(&json!(["x"])).unwrap_err();
        assert_eq!(err.errors[0].field, "vendor_ids");
    }

    #[test]
    fn test_repeater_submission() {
        let field = features();
        let submitted = json!({
            "1": {"name": "", "price": "", "vendor_ids": [""]},
            "0": {"name": "Fast", "price": "", "vendor_ids": ["3", ""]},
            "2": {"name": "", "price": "9.999", "vendor_ids": [""]}
        });

        let normalized = field.validate(&submitted).unwrap();
        assert_eq!(
            normalized,
            json!([
                {"name": "Fast", "price": null, "vendor_ids": [3]},
                {"name": "", "price": 10.0, "vendor_ids": []}
            ])
        );
    }

    #[test]
    fn test_repeater_rows_accept_multi_value_keys() {
        let field = features();
        let submitted = json!({
            "0": {"name": "", "vendor_ids[]": ["3"]},
            "1": {"name": "", "vendor_ids[]": [""]}
        });

        let normalized = field.validate(&submitted).unwrap();
        assert_eq!(
            normalized,
            json!([{"name": "", "price": null, "vendor_ids": [3]}])
        );
    }

    #[test]
    fn test_repeater_errors_are_nested() {
        let field = features();
        let submitted = json!([
            {"name": "ok", "price": "1"},
            {"name": "bad", "price": "cheap"}
        ]);

        let errors = field.validate(&submitted).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].field, "features[1].price");
        assert_eq!(errors.errors[0].message, "is not a number");
    }
}

//! Rendering-neutral input descriptions
//!
//! An `InputSpec` tells a form renderer which control to draw, under which
//! parameter name, with which options and current value. It serializes to
//! JSON so that any view technology can consume it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholder used for the row index in repeater templates
pub const INDEX_PLACEHOLDER: &str = "__INDEX__";

/// Control to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    TextArea,
    Number,
    Checkbox,
    Date,
    DateTime,
    Select,
    MultiSelect,
    Repeater,
}

/// One option of a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, selected: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            selected,
        }
    }
}

/// Description of one form control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub kind: InputKind,

    /// Parameter name (`title`, `vendor_ids[]`, `features[0][name]`)
    pub name: String,

    pub label: String,

    pub required: bool,

    /// Current value for single-value controls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Text of the blank option, when one is offered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_blank: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeater: Option<RepeaterSpec>,
}

impl InputSpec {
    pub fn new(kind: InputKind, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            label: label.into(),
            required: false,
            value: None,
            options: Vec::new(),
            include_blank: None,
            help_text: None,
            placeholder: None,
            attributes: BTreeMap::new(),
            repeater: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Values of the selected options
    pub fn selected_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect()
    }

    pub fn is_multiple(&self) -> bool {
        self.kind == InputKind::MultiSelect
    }
}

/// Rows and add-row template of a repeater control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeaterSpec {
    /// Existing rows, in order
    pub rows: Vec<RepeaterRow>,

    /// Controls of a new row; names contain [`INDEX_PLACEHOLDER`]
    pub template: Vec<InputSpec>,

    /// Token the client replaces with a fresh row index
    pub index_placeholder: String,

    /// Whether rows may be removed before submission
    pub removable: bool,

    /// Caption of the add-row button
    pub add_label: String,
}

/// One existing repeater row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeaterRow {
    pub index: usize,
    pub fields: Vec<InputSpec>,
}

//! Normalization of submitted values
//!
//! Each function turns one raw submitted value into its stored form or
//! returns the message of a field-scoped error. Repeater rows are handled in
//! `field.rs`, which recurses through the sub-fields' own strategies.

use crate::display::{is_truthy, parse_date, parse_datetime, STORED_DATE_FORMAT};
use brawo_core::FieldType;
use brawo_schema::entity::parse_reference_id;
use brawo_schema::{ids_to_value, is_blank, try_reference_ids, FieldDefinition};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

/// Suffix of multi-value parameter names (`vendor_ids[]`)
pub const MULTI_VALUE_SUFFIX: &str = "[]";

/// Field name a submitted key belongs to (`vendor_ids[]` -> `vendor_ids`)
pub fn param_name(key: &str) -> &str {
    key.strip_suffix(MULTI_VALUE_SUFFIX).unwrap_or(key)
}

/// Submitted value of a field under its bare or multi-value name
pub fn submitted<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    params
        .get(name)
        .or_else(|| params.get(&format!("{}{}", name, MULTI_VALUE_SUFFIX)))
}

/// Blank, or an array whose elements are all blank
pub fn is_blank_submission(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(is_blank_submission),
        other => is_blank(other),
    }
}

pub fn text(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Null | Value::String(_) => Ok(raw.clone()),
        Value::Bool(_) | Value::Number(_) => Ok(Value::String(raw.to_string())),
        Value::Array(_) | Value::Object(_) => Err("must be text".to_string()),
    }
}

pub fn boolean(raw: &Value) -> Result<Value, String> {
    Ok(Value::Bool(is_truthy(raw)))
}

fn is_decimal(definition: &FieldDefinition) -> bool {
    definition.field_type == FieldType::Decimal || definition.scale.is_some()
}

pub fn number(definition: &FieldDefinition, raw: &Value) -> Result<Value, String> {
    if is_blank(raw) {
        return Ok(Value::Null);
    }

    if is_decimal(definition) {
        let value = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| "is not a number".to_string())?;

        let value = match definition.scale {
            Some(scale) => {
                let factor = 10f64.powi(scale as i32);
                (value * factor).round() / factor
            }
            None => value,
        };

        return Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| "is not a number".to_string());
    }

    let integer = match raw {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64),
        },
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => return Err("is not a number".to_string()),
    };

    match integer {
        Some(i) => Ok(Value::from(i)),
        None if crate::display::as_f64(raw).is_some() => Err("must be an integer".to_string()),
        None => Err("is not a number".to_string()),
    }
}

pub fn date(raw: &Value) -> Result<Value, String> {
    if is_blank(raw) {
        return Ok(Value::Null);
    }
    raw.as_str()
        .and_then(parse_date)
        .map(|d| Value::String(d.format(STORED_DATE_FORMAT).to_string()))
        .ok_or_else(|| "is not a valid date".to_string())
}

pub fn datetime(raw: &Value) -> Result<Value, String> {
    if is_blank(raw) {
        return Ok(Value::Null);
    }
    raw.as_str()
        .and_then(parse_datetime)
        .map(|dt| {
            Value::String(
                dt.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            )
        })
        .ok_or_else(|| "is not a valid date and time".to_string())
}

pub fn select(definition: &FieldDefinition, raw: &Value) -> Result<Value, String> {
    if is_blank(raw) {
        return Ok(Value::Null);
    }

    let value = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err("is not included in the list".to_string()),
    };

    if definition.has_choice(&value) {
        Ok(Value::String(value))
    } else {
        Err("is not included in the list".to_string())
    }
}

/// Single id (taxonomy fields)
pub fn single_id(raw: &Value) -> Result<Value, String> {
    let token = match raw {
        Value::Array(items) => {
            let present: Vec<&Value> = items.iter().filter(|v| !is_blank(v)).collect();
            match present.as_slice() {
                [] => return Ok(Value::Null),
                [one] => *one,
                _ => return Err("must be a single id".to_string()),
            }
        }
        other => other,
    };

    Ok(match parse_reference_id(token)? {
        Some(id) => Value::from(id),
        None => Value::Null,
    })
}

/// Ordered unique ids (reference fields)
pub fn reference(raw: &Value) -> Result<Value, String> {
    try_reference_ids(Some(raw)).map(|ids| ids_to_value(&ids))
}

/// Repeater rows in order
///
/// Rows arrive either as an array or as a map keyed by row index (`"0"`,
/// `"1"`, `"10"`); keyed rows are ordered numerically.
pub fn collect_rows(raw: &Value) -> Result<Vec<&Map<String, Value>>, String> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => rows
            .iter()
            .map(|row| row.as_object().ok_or_else(|| "has a malformed row".to_string()))
            .collect(),
        Value::Object(keyed) => {
            let mut indexed = Vec::with_capacity(keyed.len());
            for (key, row) in keyed {
                let index = key
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("has an invalid row index '{}'", key))?;
                let row = row
                    .as_object()
                    .ok_or_else(|| "has a malformed row".to_string())?;
                indexed.push((index, row));
            }
            indexed.sort_by_key(|(index, _)| *index);
            Ok(indexed.into_iter().map(|(_, row)| row).collect())
        }
        _ => Err("must be a list of rows".to_string()),
    }
}

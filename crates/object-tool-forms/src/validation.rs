//! Field-level validation and type coercion.
//!
//! [`clean_field_value`] turns one raw submitted string into a typed JSON
//! value according to the field definition, and [`clean_fields`] runs a
//! whole field list, accumulating per-field error messages.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use object_tool_core::{ObjectToolError, ToolResult};

use crate::fields::{FormFieldDef, FormFieldType};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Cleans a single raw value against its field definition.
///
/// Returns `Ok(None)` for an omitted optional field with no initial value.
///
/// # Errors
///
/// Returns [`ObjectToolError::Validation`] with a user-facing message when
/// the value is missing but required, fails to parse, or violates the
/// field's constraints.
pub fn clean_field_value(
    field: &FormFieldDef,
    raw: Option<&str>,
) -> ToolResult<Option<serde_json::Value>> {
    // Checkboxes submit nothing when unchecked.
    if matches!(field.field_type, FormFieldType::Boolean) {
        let truthy = raw.is_some_and(|v| matches!(v, "true" | "True" | "on" | "1"));
        return Ok(Some(serde_json::Value::Bool(truthy)));
    }

    let raw = match raw {
        Some(v) if !v.is_empty() => v,
        _ => {
            if field.required && field.initial.is_none() {
                return Err(ObjectToolError::Validation(
                    "This field is required.".to_string(),
                ));
            }
            return Ok(field.initial.clone());
        }
    };

    match &field.field_type {
        FormFieldType::Char {
            min_length,
            max_length,
            strip,
        } => {
            let value = if *strip { raw.trim() } else { raw };
            if field.required && value.is_empty() {
                return Err(ObjectToolError::Validation(
                    "This field is required.".to_string(),
                ));
            }
            if let Some(min) = min_length {
                if value.chars().count() < *min {
                    return Err(ObjectToolError::Validation(format!(
                        "Ensure this value has at least {min} characters."
                    )));
                }
            }
            if let Some(max) = max_length {
                if value.chars().count() > *max {
                    return Err(ObjectToolError::Validation(format!(
                        "Ensure this value has at most {max} characters."
                    )));
                }
            }
            Ok(Some(serde_json::Value::String(value.to_string())))
        }
        FormFieldType::Integer {
            min_value,
            max_value,
        } => {
            let value: i64 = raw.trim().parse().map_err(|_| {
                ObjectToolError::Validation("Enter a whole number.".to_string())
            })?;
            if let Some(min) = min_value {
                if value < *min {
                    return Err(ObjectToolError::Validation(format!(
                        "Ensure this value is greater than or equal to {min}."
                    )));
                }
            }
            if let Some(max) = max_value {
                if value > *max {
                    return Err(ObjectToolError::Validation(format!(
                        "Ensure this value is less than or equal to {max}."
                    )));
                }
            }
            Ok(Some(serde_json::json!(value)))
        }
        FormFieldType::Float {
            min_value,
            max_value,
        } => {
            let value: f64 = raw.trim().parse().map_err(|_| {
                ObjectToolError::Validation("Enter a number.".to_string())
            })?;
            if let Some(min) = min_value {
                if value < *min {
                    return Err(ObjectToolError::Validation(format!(
                        "Ensure this value is greater than or equal to {min}."
                    )));
                }
            }
            if let Some(max) = max_value {
                if value > *max {
                    return Err(ObjectToolError::Validation(format!(
                        "Ensure this value is less than or equal to {max}."
                    )));
                }
            }
            Ok(Some(serde_json::json!(value)))
        }
        FormFieldType::Boolean => unreachable!("handled above"),
        FormFieldType::Email => {
            let value = raw.trim();
            if EMAIL_RE.is_match(value) {
                Ok(Some(serde_json::Value::String(value.to_string())))
            } else {
                Err(ObjectToolError::Validation(
                    "Enter a valid email address.".to_string(),
                ))
            }
        }
        FormFieldType::Choice { choices } => {
            if choices.iter().any(|(value, _)| value == raw) {
                Ok(Some(serde_json::Value::String(raw.to_string())))
            } else {
                Err(ObjectToolError::Validation(format!(
                    "Select a valid choice. {raw} is not one of the available choices."
                )))
            }
        }
    }
}

/// Cleans every field, filling `cleaned` with coerced values and `errors`
/// with per-field message lists. Fields that fail do not appear in
/// `cleaned`.
pub fn clean_fields(
    fields: &[FormFieldDef],
    raw_data: &HashMap<String, Option<String>>,
    cleaned: &mut HashMap<String, serde_json::Value>,
    errors: &mut HashMap<String, Vec<String>>,
) {
    for field in fields {
        let raw = raw_data.get(&field.name).and_then(Option::as_deref);
        match clean_field_value(field, raw) {
            Ok(Some(value)) => {
                cleaned.insert(field.name.clone(), value);
            }
            Ok(None) => {}
            Err(e) => {
                let message = match e {
                    ObjectToolError::Validation(msg) => msg,
                    other => other.to_string(),
                };
                errors.entry(field.name.clone()).or_default().push(message);
            }
        }
    }
}

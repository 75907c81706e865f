//! Write-payload validation
//!
//! Payload structs derive [`validator::Validate`] with `Option<Value>`
//! fields so that type checks produce field messages instead of
//! deserialization failures. The request body goes through [`normalize`]
//! first: strings are trimmed and empty strings become `null`.

use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

/// Error code a custom validator reports; also picks the message
fn invalid(code: &'static str) -> validator::ValidationError {
    validator::ValidationError::new(code)
}

/// Validator: value is a JSON string
pub fn is_string(value: &Value) -> Result<(), validator::ValidationError> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(invalid("string")),
    }
}

/// Validator: value is an integer or an integer-looking string
pub fn is_integer(value: &Value) -> Result<(), validator::ValidationError> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
        Value::String(s) if s.parse::<i64>().is_ok() => Ok(()),
        _ => Err(invalid("integer")),
    }
}

/// Validator: value is a number or a numeric string
pub fn is_numeric(value: &Value) -> Result<(), validator::ValidationError> {
    match value {
        Value::Number(_) => Ok(()),
        Value::String(s) if s.parse::<f64>().is_ok() => Ok(()),
        _ => Err(invalid("numeric")),
    }
}

/// Trim strings and turn empty strings into `null`, one level deep
pub fn normalize(body: Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) if s.trim().is_empty() => Value::Null,
                        Value::String(s) => Value::String(s.trim().to_string()),
                        other => other,
                    };
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

/// Deserialize and validate a JSON body
///
/// `order` lists the payload's fields; error keys follow it.
pub fn parse<T>(body: Value, order: &[&str]) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    if !body.is_object() {
        return Err(ValidationError::InvalidJson {
            message: "expected a JSON object".to_string(),
        });
    }

    let payload: T =
        serde_json::from_value(normalize(body)).map_err(|e| ValidationError::InvalidJson {
            message: e.to_string(),
        })?;

    payload
        .validate()
        .map_err(|errors| ValidationError::Fields(field_errors(&errors, order)))?;

    Ok(payload)
}

/// Turn validator errors into ordered `field -> messages`
pub fn field_errors(errors: &ValidationErrors, order: &[&str]) -> IndexMap<String, Vec<String>> {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let label = humanize(&field);
            let messages = errs.iter().map(|e| message(&e.code, &label)).collect();
            (field, messages)
        })
        .collect();

    fields.sort_by_key(|(field, _)| {
        order
            .iter()
            .position(|f| *f == field.as_str())
            .unwrap_or(order.len())
    });

    fields.into_iter().collect()
}

/// `parent_id` -> `parent id`
pub fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

fn message(code: &str, label: &str) -> String {
    match code {
        "required" => format!("The {} field is required.", label),
        "string" => format!("The {} must be a string.", label),
        "integer" => format!("The {} must be an integer.", label),
        "numeric" => format!("The {} must be a number.", label),
        _ => format!("The {} is invalid.", label),
    }
}

/// Convert a validated JSON value to a stored attribute
pub fn to_field(value: Option<Value>) -> FieldValue {
    match value {
        None | Some(Value::Null) => FieldValue::Null,
        Some(Value::Bool(b)) => FieldValue::Boolean(b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => n.as_f64().map_or(FieldValue::Null, FieldValue::Float),
        },
        Some(Value::String(s)) => FieldValue::String(s),
        Some(other) => FieldValue::String(other.to_string()),
    }
}

/// Like [`to_field`], reading numeric strings as numbers
pub fn to_number(value: Option<Value>) -> FieldValue {
    match value {
        Some(Value::String(s)) => match s.parse::<i64>() {
            Ok(i) => FieldValue::Integer(i),
            Err(_) => s
                .parse::<f64>()
                .map_or(FieldValue::String(s), FieldValue::Float),
        },
        other => to_field(other),
    }
}

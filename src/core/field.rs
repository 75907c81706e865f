//! Field value types and text coercion

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A polymorphic attribute value stored on a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    String(String),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Render the value the way it appears in a query string
    ///
    /// Returns `None` for `Null`, which has no textual form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Null => None,
        }
    }

    /// Exact comparison against a raw query-string token
    ///
    /// The token is coerced to this value's type. A token that cannot be
    /// coerced never matches, so `stock=abc` selects nothing instead of
    /// failing.
    pub fn matches_text(&self, token: &str) -> bool {
        match self {
            FieldValue::Integer(i) => token.parse::<i64>().is_ok_and(|t| t == *i),
            FieldValue::Float(f) => token.parse::<f64>().is_ok_and(|t| t == *f),
            FieldValue::Boolean(b) => parse_bool(token).is_some_and(|t| t == *b),
            FieldValue::DateTime(dt) => parse_datetime(token).is_some_and(|t| t == *dt),
            FieldValue::String(s) => s == token,
            FieldValue::Null => false,
        }
    }

    /// Case-insensitive partial match against the value's text form
    pub fn contains_text(&self, needle: &str) -> bool {
        self.to_text()
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase()))
    }

    /// Total order used for sorting; nulls sort first
    pub fn sort_cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            (a, b) => a.to_text().cmp(&b.to_text()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Parse the date formats accepted in filters
///
/// RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(token, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_field_value_integer() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_string(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert_eq!(value.to_text(), None);
        assert!(!value.matches_text(""));
    }

    #[test]
    fn test_integer_matches_numeric_token() {
        let value = FieldValue::Integer(2);
        assert!(value.matches_text("2"));
        assert!(!value.matches_text("3"));
    }

    #[test]
    fn test_integer_never_matches_garbage() {
        let value = FieldValue::Integer(2);
        assert!(!value.matches_text("asalaja"));
        assert!(!value.matches_text("2.0"));
    }

    #[test]
    fn test_string_match_is_exact() {
        let value = FieldValue::from("Nike Shoes");
        assert!(value.matches_text("Nike Shoes"));
        assert!(!value.matches_text("nike shoes"));
        assert!(!value.matches_text("Nike"));
    }

    #[test]
    fn test_datetime_matches_several_formats() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let value = FieldValue::DateTime(dt);
        assert!(value.matches_text("2024-05-01"));
        assert!(value.matches_text("2024-05-01 00:00:00"));
        assert!(value.matches_text("2024-05-01T00:00:00Z"));
        assert!(!value.matches_text("yesterday"));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let value = FieldValue::from("Nike Shoes");
        assert!(value.contains_text("nike"));
        assert!(value.contains_text("SHOE"));
        assert!(!value.contains_text("puma"));
    }

    #[test]
    fn test_contains_on_integer_uses_text_form() {
        assert!(FieldValue::Integer(1234).contains_text("23"));
        assert!(!FieldValue::Null.contains_text(""));
    }

    #[test]
    fn test_sort_cmp_puts_nulls_first() {
        use std::cmp::Ordering;
        assert_eq!(
            FieldValue::Null.sort_cmp(&FieldValue::Integer(1)),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Integer(3).sort_cmp(&FieldValue::Integer(1)),
            Ordering::Greater
        );
        assert_eq!(
            FieldValue::from("a").sort_cmp(&FieldValue::from("b")),
            Ordering::Less
        );
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<i64> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(7_i64)), FieldValue::Integer(7));
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_value(FieldValue::Integer(5)).unwrap();
        assert_eq!(json, serde_json::json!(5));
        let json = serde_json::to_value(FieldValue::Null).unwrap();
        assert!(json.is_null());
    }
}

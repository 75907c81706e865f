//! Reusable list-query validators
//!
//! Each validator checks one raw query-string token and returns the
//! message to report under the parameter's key.

use crate::core::field::parse_datetime;
use crate::core::query::{RawQuery, split_list};
use indexmap::IndexMap;
use std::sync::Arc;

/// A token validator: `(key, token) -> Result<(), message>`
pub type Rule = Arc<dyn Fn(&str, &str) -> Result<(), String> + Send + Sync>;

/// Validator: token is an integer within `min..=max`
pub fn integer_between(
    min: i128,
    max: i128,
) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |key: &str, token: &str| match token.parse::<i128>() {
        Err(_) => Err(format!("The {} must be an integer.", key)),
        Ok(n) if n < min || n > max => {
            Err(format!("The {} must be between {} and {}.", key, min, max))
        }
        Ok(_) => Ok(()),
    }
}

/// Validator: token is a date the filters understand
pub fn date() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |key: &str, token: &str| match parse_datetime(token) {
        Some(_) => Ok(()),
        None => Err(format!("The {} is not a valid date.", key)),
    }
}

/// Validator: token length in characters is within `min..=max`
pub fn text_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |key: &str, token: &str| {
        let len = token.chars().count();
        if len < min || len > max {
            Err(format!(
                "The {} must be between {} and {} characters.",
                key, min, max
            ))
        } else {
            Ok(())
        }
    }
}

/// Highest page number whose offset stays within `i64` at `max_page_size`
fn last_page_number(max_page_size: u64) -> i128 {
    i128::from(i64::MAX) / i128::from(max_page_size.max(1)) + 1
}

/// Validation rules for one resource's list endpoint
///
/// Keys use dotted notation: `filter.<field>`, `page.number`, `page.size`
/// and `search`. Filter values are split on commas and every token is
/// checked on its own. Blank values are not checked; the list engine
/// ignores them anyway.
#[derive(Clone, Default)]
pub struct QueryRules {
    rules: IndexMap<String, Vec<Rule>>,
}

impl QueryRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator for `key`
    pub fn rule<F>(mut self, key: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules
            .entry(key.into())
            .or_default()
            .push(Arc::new(validator));
        self
    }

    /// Add the same validator to several filter fields
    pub fn filters<F>(mut self, fields: &[&str], validator: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone + 'static,
    {
        for field in fields {
            self = self.rule(format!("filter.{}", field), validator.clone());
        }
        self
    }

    /// Rules shared by every list endpoint: page number, page size and search
    ///
    /// The page number is capped so the row offset fits an `i64`.
    pub fn with_common(self, max_page_size: u64) -> Self {
        self.rule("page.number", integer_between(1, last_page_number(max_page_size)))
            .rule("page.size", integer_between(1, i128::from(max_page_size)))
            .rule("search", text_length(3, 60))
    }

    /// Check a raw query, collecting every message per key
    pub fn check(&self, raw: &RawQuery) -> Result<(), IndexMap<String, Vec<String>>> {
        let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();

        for (field, value) in &raw.filter {
            let key = format!("filter.{}", field);
            for token in split_list(value) {
                self.apply(&key, token, &mut errors);
            }
        }

        let singles = [
            ("page.number", raw.page_number.as_deref()),
            ("page.size", raw.page_size.as_deref()),
            ("search", raw.search.as_deref()),
        ];
        for (key, value) in singles {
            if let Some(token) = value.map(str::trim).filter(|t| !t.is_empty()) {
                self.apply(key, token, &mut errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn apply(&self, key: &str, token: &str, errors: &mut IndexMap<String, Vec<String>>) {
        let Some(rules) = self.rules.get(key) else {
            return;
        };
        for rule in rules {
            if let Err(message) = (**rule)(key, token) {
                let messages = errors.entry(key.to_string()).or_default();
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }
    }
}

impl std::fmt::Debug for QueryRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRules")
            .field("keys", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

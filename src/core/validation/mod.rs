//! Request validation
//!
//! List queries are checked against a per-resource [`QueryRules`] table
//! before they reach the list engine; write payloads are validated with
//! `validator` derives. Both report failures as
//! [`ValidationError::Fields`](crate::core::error::ValidationError::Fields),
//! which the HTTP layer renders as a 422 response.

pub mod payload;
pub mod rules;

pub use payload::{field_errors, humanize, normalize, parse};
pub use rules::{QueryRules, Rule, date, integer_between, text_length};

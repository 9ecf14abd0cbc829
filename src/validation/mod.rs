// validation - per-resource field checks producing a field -> message map

pub mod client;
pub mod contact;
pub mod invoice;
pub mod project;
pub mod task;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use crate::types::Mode;

pub type FieldErrors = BTreeMap<String, String>;

/// A payload field: `None` absent, `Some(None)` explicit null, `Some(Some(v))` a value
pub type Field<T> = Option<Option<T>>;

/// Deserialize helper that keeps "present but null" apart from "absent".
/// Use with `#[serde(default, deserialize_with = "present")]`.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Value of a field when it carries one
pub fn value<T>(field: &Field<T>) -> Option<&T> {
    field.as_ref().and_then(|v| v.as_ref())
}

/// Trimmed text value, with blank treated as absent
pub fn text(field: &Field<String>) -> Option<&str> {
    value(field).map(|s| s.trim()).filter(|s| !s.is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 190 || email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') || local.starts_with('.') || local.ends_with('.') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// "contact_name" -> "Contact name", "client_id" -> "Client ID"
fn label(field: &str) -> String {
    let words = match field.strip_suffix("_id") {
        Some(stem) => format!("{} ID", stem.replace('_', " ")),
        None => field.replace('_', " "),
    };
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Integer digits allowed by NUMERIC(12,2) money columns
pub const MONEY_DIGITS: u32 = 10;
/// NUMERIC(5,2)
pub const RATE_DIGITS: u32 = 3;
/// NUMERIC(10,2)
pub const QUANTITY_DIGITS: u32 = 8;

/// Why `value` does not fit a non-negative NUMERIC(digits + 2, 2) column
pub fn amount_problem(value: Decimal, digits: u32) -> Option<String> {
    let limit = Decimal::from(10i64.pow(digits));
    if value.is_sign_negative() && !value.is_zero() {
        Some("must be zero or greater".to_string())
    } else if value >= limit {
        Some(format!("must be less than {}", limit))
    } else if value.normalize().scale() > 2 {
        Some("must have at most 2 decimal places".to_string())
    } else {
        None
    }
}

/// Accumulates field errors for one payload
#[derive(Debug)]
pub struct Validator {
    mode: Mode,
    errors: FieldErrors,
}

impl Validator {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            errors: FieldErrors::new(),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
        self
    }

    /// Mandatory on create; on update it may be omitted but not nulled or blanked
    pub fn required_text(&mut self, field: &str, value: &Field<String>, max: usize) -> &mut Self {
        match value {
            None if self.mode == Mode::Create => {
                self.error(field, format!("{} is required", label(field)));
            }
            None => {}
            Some(_) if text(value).is_none() => {
                self.error(field, format!("{} is required", label(field)));
            }
            Some(_) => {
                self.max_len(field, value, max);
            }
        }
        self
    }

    pub fn optional_text(&mut self, field: &str, value: &Field<String>, max: usize) -> &mut Self {
        self.max_len(field, value, max)
    }

    fn max_len(&mut self, field: &str, value: &Field<String>, max: usize) -> &mut Self {
        if let Some(s) = text(value) {
            if s.chars().count() > max {
                self.error(
                    field,
                    format!("{} too long (max {} characters)", label(field), max),
                );
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &Field<String>) -> &mut Self {
        if let Some(s) = text(value) {
            if !is_valid_email(s) {
                self.error(field, "Invalid email format");
            }
        }
        self
    }

    /// Enumerated, non-nullable column with a database default
    pub fn one_of(
        &mut self,
        field: &str,
        value: &Field<String>,
        is_allowed: impl Fn(&str) -> bool,
        allowed: &str,
    ) -> &mut Self {
        match value {
            None => {}
            Some(Some(s)) if is_allowed(s) => {}
            Some(_) => {
                self.error(field, format!("{} must be one of: {}", label(field), allowed));
            }
        }
        self
    }

    pub fn date(&mut self, field: &str, value: &Field<String>) -> &mut Self {
        if let Some(s) = text(value) {
            if parse_date(s).is_none() {
                self.error(field, format!("{} must be a date (YYYY-MM-DD)", label(field)));
            }
        }
        self
    }

    /// Non-nullable, non-negative money or rate with `digits` places before the point
    pub fn amount(&mut self, field: &str, value: &Field<Decimal>, digits: u32) -> &mut Self {
        match value {
            None => {}
            Some(None) => {
                self.error(field, format!("{} cannot be null", label(field)));
            }
            Some(Some(d)) => {
                if let Some(problem) = amount_problem(*d, digits) {
                    self.error(field, format!("{} {}", label(field), problem));
                }
            }
        }
        self
    }

    /// Mandatory reference on create; never nullable
    pub fn required_ref(&mut self, field: &str, value: &Field<i64>) -> &mut Self {
        match value {
            None if self.mode == Mode::Create => {
                self.error(field, format!("{} is required", label(field)));
            }
            None => {}
            Some(None) => {
                self.error(field, format!("{} is required", label(field)));
            }
            Some(Some(id)) if *id <= 0 => {
                self.error(field, format!("{} is invalid", label(field)));
            }
            Some(Some(_)) => {}
        }
        self
    }

    pub fn optional_ref(&mut self, field: &str, value: &Field<i64>) -> &mut Self {
        if let Some(Some(id)) = value {
            if *id <= 0 {
                self.error(field, format!("{} is invalid", label(field)));
            }
        }
        self
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

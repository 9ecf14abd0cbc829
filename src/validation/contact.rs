use serde::Deserialize;
use serde_json::{Map, Value};

use super::{is_valid_email, FieldErrors};

/// Public contact form submission
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Trimmed, validated contact submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The `website` honeypot is filled in. Runs on the raw body, before typed parsing.
pub fn honeypot_tripped(fields: &Map<String, Value>) -> bool {
    match fields.get("website") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

impl ContactRequest {
    pub fn validate(&self) -> Result<ContactSubmission, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = trimmed(&self.name);
        let email = trimmed(&self.email);
        let phone = trimmed(&self.phone);
        let company = trimmed(&self.company);
        let message = trimmed(&self.message);

        match &name {
            None => {
                errors.insert("name".into(), "Name is required".into());
            }
            Some(n) if n.chars().count() > 190 => {
                errors.insert("name".into(), "Name too long (max 190 characters)".into());
            }
            Some(_) => {}
        }
        match &email {
            None => {
                errors.insert("email".into(), "Email is required".into());
            }
            Some(e) if !is_valid_email(e) => {
                errors.insert("email".into(), "Invalid email format".into());
            }
            Some(_) => {}
        }
        if phone.as_ref().is_some_and(|p| p.chars().count() > 50) {
            errors.insert("phone".into(), "Phone too long (max 50 characters)".into());
        }
        if company.as_ref().is_some_and(|c| c.chars().count() > 190) {
            errors.insert("company".into(), "Company too long (max 190 characters)".into());
        }
        if message.as_ref().is_some_and(|m| m.chars().count() > 5000) {
            errors.insert("message".into(), "Message too long (max 5000 characters)".into());
        }

        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(ContactSubmission {
                name,
                email,
                phone,
                company,
                message,
            }),
            _ => Err(errors),
        }
    }
}

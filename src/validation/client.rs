use serde::Deserialize;

use super::{present, Field, FieldErrors, Validator};
use crate::types::{ClientStatus, Mode};

#[derive(Debug, Default, Deserialize)]
pub struct ClientInput {
    #[serde(default, deserialize_with = "present")]
    pub company_name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub contact_name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub email: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub source: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Field<String>,
}

impl ClientInput {
    pub fn validate(&self, mode: Mode) -> FieldErrors {
        let mut v = Validator::new(mode);
        v.required_text("contact_name", &self.contact_name, 190)
            .required_text("email", &self.email, 190)
            .email("email", &self.email)
            .one_of(
                "status",
                &self.status,
                |s| ClientStatus::parse(s).is_some(),
                &ClientStatus::allowed(),
            )
            .optional_text("company_name", &self.company_name, 190)
            .optional_text("phone", &self.phone, 50)
            .optional_text("source", &self.source, 100);
        v.into_errors()
    }
}

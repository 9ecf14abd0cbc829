use serde::Deserialize;

use super::{parse_date, present, text, Field, FieldErrors, Validator};
use crate::types::{Mode, ProjectStatus};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectInput {
    #[serde(default, deserialize_with = "present")]
    pub client_id: Field<i64>,
    #[serde(default, deserialize_with = "present")]
    pub name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub starts_on: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub ends_on: Field<String>,
}

impl ProjectInput {
    pub fn validate(&self, mode: Mode) -> FieldErrors {
        let mut v = Validator::new(mode);
        v.required_ref("client_id", &self.client_id)
            .required_text("name", &self.name, 190)
            .one_of(
                "status",
                &self.status,
                |s| ProjectStatus::parse(s).is_some(),
                &ProjectStatus::allowed(),
            )
            .date("starts_on", &self.starts_on)
            .date("ends_on", &self.ends_on);

        let starts = text(&self.starts_on).and_then(parse_date);
        let ends = text(&self.ends_on).and_then(parse_date);
        if let (Some(starts), Some(ends)) = (starts, ends) {
            if ends < starts {
                v.error("ends_on", "Ends on must not be before starts on");
            }
        }

        v.into_errors()
    }
}

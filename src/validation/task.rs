use serde::Deserialize;

use super::{present, Field, FieldErrors, Validator};
use crate::types::{Mode, TaskPriority, TaskStatus};

#[derive(Debug, Default, Deserialize)]
pub struct TaskInput {
    #[serde(default, deserialize_with = "present")]
    pub project_id: Field<i64>,
    #[serde(default, deserialize_with = "present")]
    pub client_id: Field<i64>,
    #[serde(default, deserialize_with = "present")]
    pub title: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_at: Field<String>,
}

impl TaskInput {
    pub fn validate(&self, mode: Mode) -> FieldErrors {
        let mut v = Validator::new(mode);
        v.required_text("title", &self.title, 190)
            .optional_ref("project_id", &self.project_id)
            .optional_ref("client_id", &self.client_id)
            .one_of(
                "status",
                &self.status,
                |s| TaskStatus::parse(s).is_some(),
                &TaskStatus::allowed(),
            )
            .one_of(
                "priority",
                &self.priority,
                |s| TaskPriority::parse(s).is_some(),
                &TaskPriority::allowed(),
            )
            .date("due_at", &self.due_at);
        v.into_errors()
    }
}

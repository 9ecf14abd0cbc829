use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task with the names of its optional client and project
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub project_id: Option<i64>,
    pub client_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client_name: Option<String>,
    pub project_name: Option<String>,
}

/// Dashboard to-do row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpenTask {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_at: Option<NaiveDate>,
    pub client_name: Option<String>,
}

use sqlx::PgPool;

use crate::database::list_query::{Filters, Page};
use crate::database::manager::DatabaseError;
use crate::database::models::Task;
use crate::database::params::bind_query_as;
use crate::database::patch::{Column, PatchTable};
use crate::types::{TaskPriority, TaskStatus};
use crate::validation::task::TaskInput;
use crate::validation::{parse_date, text, value};

const SELECT: &str = "SELECT t.id, t.project_id, t.client_id, t.title, t.description, t.status, \
                      t.priority, t.due_at, t.created_at, t.updated_at, \
                      c.contact_name AS client_name, p.name AS project_name \
                      FROM tasks t \
                      LEFT JOIN clients c ON c.id = t.client_id \
                      LEFT JOIN projects p ON p.id = t.project_id";

/// Rank expressions shared with the dashboard
pub const STATUS_RANK: &str =
    "CASE t.status WHEN 'in_progress' THEN 1 WHEN 'todo' THEN 2 WHEN 'done' THEN 3 END";
pub const PRIORITY_RANK: &str =
    "CASE t.priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 WHEN 'low' THEN 3 END";

pub const PATCH: PatchTable = PatchTable {
    table: "tasks",
    columns: &[
        Column::bigint("project_id"),
        Column::bigint("client_id"),
        Column::text("title"),
        Column::text("description"),
        Column::text("status"),
        Column::text("priority"),
        Column::date("due_at"),
    ],
    touch: Some("updated_at"),
};

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<i64>,
    pub client_id: Option<i64>,
}

/// Ordered by status rank, then priority rank, then due date
pub async fn list(pool: &PgPool, filter: &TaskFilter, page: Page) -> Result<Vec<Task>, DatabaseError> {
    let mut filters = Filters::new();
    if let Some(status) = filter.status {
        filters.eq("t.status", status.as_str());
    }
    if let Some(priority) = filter.priority {
        filters.eq("t.priority", priority.as_str());
    }
    if let Some(project_id) = filter.project_id {
        filters.eq("t.project_id", project_id);
    }
    if let Some(client_id) = filter.client_id {
        filters.eq("t.client_id", client_id);
    }
    let (tail, params) = filters.paged(page);
    let sql = format!(
        "{}{} ORDER BY {}, {}, t.due_at ASC, t.id ASC{}",
        SELECT,
        filters.where_clause(),
        STATUS_RANK,
        PRIORITY_RANK,
        tail
    );
    let tasks = bind_query_as(sqlx::query_as::<_, Task>(&sql), &params)
        .fetch_all(pool)
        .await?;
    Ok(tasks)
}

pub async fn for_project(pool: &PgPool, project_id: i64) -> Result<Vec<Task>, DatabaseError> {
    let sql = format!(
        "{} WHERE t.project_id = $1 ORDER BY t.created_at DESC, t.id DESC",
        SELECT
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await?;
    Ok(tasks)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Task>, DatabaseError> {
    let sql = format!("{} WHERE t.id = $1", SELECT);
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

pub async fn insert(pool: &PgPool, input: &TaskInput) -> Result<i64, DatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tasks (project_id, client_id, title, description, status, priority, due_at)
         VALUES ($1, $2, $3, $4, COALESCE($5::TEXT, 'todo'), COALESCE($6::TEXT, 'medium'), $7)
         RETURNING id",
    )
    .bind(value(&input.project_id).copied())
    .bind(value(&input.client_id).copied())
    .bind(text(&input.title))
    .bind(text(&input.description))
    .bind(text(&input.status))
    .bind(text(&input.priority))
    .bind(text(&input.due_at).and_then(parse_date))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Deletes the task and returns its title
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<String>, DatabaseError> {
    let title = sqlx::query_scalar::<_, String>("DELETE FROM tasks WHERE id = $1 RETURNING title")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(title)
}

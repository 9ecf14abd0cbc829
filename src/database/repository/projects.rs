use sqlx::PgPool;

use crate::database::list_query::{Filters, Page};
use crate::database::manager::DatabaseError;
use crate::database::models::{Project, ProjectDetail};
use crate::database::params::bind_query_as;
use crate::database::patch::{Column, PatchTable};
use crate::types::ProjectStatus;
use crate::validation::project::ProjectInput;
use crate::validation::{parse_date, text, value};

use super::tasks;

const SELECT: &str = "SELECT p.id, p.client_id, p.name, p.status, p.starts_on, p.ends_on, \
                      p.created_at, p.updated_at, c.contact_name, c.company_name \
                      FROM projects p JOIN clients c ON c.id = p.client_id";

pub const PATCH: PatchTable = PatchTable {
    table: "projects",
    columns: &[
        Column::bigint("client_id"),
        Column::text("name"),
        Column::text("status"),
        Column::date("starts_on"),
        Column::date("ends_on"),
    ],
    touch: Some("updated_at"),
};

#[derive(Debug, Default, Clone)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub client_id: Option<i64>,
}

pub async fn list(
    pool: &PgPool,
    filter: &ProjectFilter,
    page: Page,
) -> Result<Vec<Project>, DatabaseError> {
    let mut filters = Filters::new();
    if let Some(status) = filter.status {
        filters.eq("p.status", status.as_str());
    }
    if let Some(client_id) = filter.client_id {
        filters.eq("p.client_id", client_id);
    }
    let (tail, params) = filters.paged(page);
    let sql = format!(
        "{}{} ORDER BY p.created_at DESC, p.id DESC{}",
        SELECT,
        filters.where_clause(),
        tail
    );
    let projects = bind_query_as(sqlx::query_as::<_, Project>(&sql), &params)
        .fetch_all(pool)
        .await?;
    Ok(projects)
}

/// Project with its tasks, newest first
pub async fn find(pool: &PgPool, id: i64) -> Result<Option<ProjectDetail>, DatabaseError> {
    let sql = format!("{} WHERE p.id = $1", SELECT);
    let Some(project) = sqlx::query_as::<_, Project>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let tasks = tasks::for_project(pool, id).await?;
    Ok(Some(ProjectDetail { project, tasks }))
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

pub async fn insert(pool: &PgPool, input: &ProjectInput) -> Result<i64, DatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO projects (client_id, name, status, starts_on, ends_on)
         VALUES ($1, $2, COALESCE($3::TEXT, 'planned'), $4, $5)
         RETURNING id",
    )
    .bind(value(&input.client_id).copied())
    .bind(text(&input.name))
    .bind(text(&input.status))
    .bind(text(&input.starts_on).and_then(parse_date))
    .bind(text(&input.ends_on).and_then(parse_date))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Deletes the project and returns its name
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<String>, DatabaseError> {
    let name = sqlx::query_scalar::<_, String>("DELETE FROM projects WHERE id = $1 RETURNING name")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(name)
}

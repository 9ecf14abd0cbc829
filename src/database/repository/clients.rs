use sqlx::PgPool;

use crate::database::list_query::{Filters, Page};
use crate::database::manager::DatabaseError;
use crate::database::models::Client;
use crate::database::params::{bind_query_as, bind_query_scalar};
use crate::database::patch::{Column, PatchTable};
use crate::types::ClientStatus;
use crate::validation::client::ClientInput;
use crate::validation::text;

const SELECT: &str = "SELECT id, company_name, contact_name, email, phone, status, source, notes, \
                      created_at, updated_at FROM clients";

/// Columns the API may change on PUT /clients, in assignment order
pub const PATCH: PatchTable = PatchTable {
    table: "clients",
    columns: &[
        Column::text("company_name"),
        Column::text("contact_name"),
        Column::text("email"),
        Column::text("phone"),
        Column::text("status"),
        Column::text("source"),
        Column::text("notes"),
    ],
    touch: Some("updated_at"),
};

#[derive(Debug, Default, Clone)]
pub struct ClientFilter {
    pub status: Option<ClientStatus>,
    pub search: Option<String>,
}

impl ClientFilter {
    fn filters(&self) -> Filters {
        let mut filters = Filters::new();
        if let Some(status) = self.status {
            filters.eq("status", status.as_str());
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filters.search(&["contact_name", "email", "company_name"], term);
        }
        filters
    }
}

/// One page of clients, newest first, plus the total matching the same filter
pub async fn list(
    pool: &PgPool,
    filter: &ClientFilter,
    page: Page,
) -> Result<(Vec<Client>, i64), DatabaseError> {
    let filters = filter.filters();
    let where_clause = filters.where_clause();
    let (tail, params) = filters.paged(page);

    let sql = format!("{}{} ORDER BY created_at DESC, id DESC{}", SELECT, where_clause, tail);
    let clients = bind_query_as(sqlx::query_as::<_, Client>(&sql), &params)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM clients{}", where_clause);
    let total = bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql), filters.params())
        .fetch_one(pool)
        .await?;

    Ok((clients, total))
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Client>, DatabaseError> {
    let sql = format!("{} WHERE id = $1", SELECT);
    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(client)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

/// Whether another client already uses `email` (case-insensitive)
pub async fn email_taken(
    pool: &PgPool,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM clients
                       WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(email.trim())
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

pub async fn insert(pool: &PgPool, input: &ClientInput) -> Result<i64, DatabaseError> {
    let status = text(&input.status).unwrap_or(ClientStatus::Lead.as_str());
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO clients (company_name, contact_name, email, phone, status, source, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(text(&input.company_name))
    .bind(text(&input.contact_name))
    .bind(text(&input.email))
    .bind(text(&input.phone))
    .bind(status)
    .bind(text(&input.source))
    .bind(text(&input.notes))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Identifying fields captured before a delete
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<String>, DatabaseError> {
    let email = sqlx::query_scalar::<_, String>("DELETE FROM clients WHERE id = $1 RETURNING email")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(email)
}

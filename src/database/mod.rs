pub mod list_query;
pub mod manager;
pub mod models;
pub mod params;
pub mod patch;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};

use sqlx::{Executor, Postgres};

use params::bind_query;
use patch::UpdateStatement;

/// Run a statement produced by the patch builder; returns rows affected
pub async fn execute_update<'c, E>(executor: E, stmt: &UpdateStatement) -> Result<u64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = bind_query(sqlx::query(&stmt.sql), &stmt.params)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

use sqlx::PgPool;

use crate::auth::lockout::LoginState;
use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Email comparison is case-insensitive
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, failed_attempts, locked_until
         FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, failed_attempts, locked_until FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn store_login_state(
    pool: &PgPool,
    id: i64,
    state: &LoginState,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE users SET failed_attempts = $1, locked_until = $2, updated_at = NOW() WHERE id = $3",
    )
    .bind(state.failed_attempts)
    .bind(state.locked_until)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create(pool: &PgPool, email: &str, password_hash: &str) -> Result<i64, DatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(email.trim())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

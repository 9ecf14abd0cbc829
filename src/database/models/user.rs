use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::auth::lockout::LoginState;

/// Login account. Never serialized: the hash stays server-side.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl User {
    pub fn login_state(&self) -> LoginState {
        LoginState {
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
        }
    }
}

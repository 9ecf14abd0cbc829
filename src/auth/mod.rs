// auth - credential checks and the login lockout state machine

pub mod lockout;
pub mod password;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::repository::users;
use lockout::{AccountStatus, LockoutPolicy};

/// Result of one login attempt, after the user's counters have been persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { user_id: i64 },
    UnknownEmail,
    Locked { user_id: i64, until: DateTime<Utc> },
    WrongPassword { user_id: i64, attempts: i32, locked: bool },
}

/// Run the lockout state machine for `email` / `password`
pub async fn attempt_login(
    pool: &PgPool,
    policy: &LockoutPolicy,
    email: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<LoginOutcome, DatabaseError> {
    let Some(user) = users::find_by_email(pool, email).await? else {
        password::verify_dummy(password.to_string()).await;
        return Ok(LoginOutcome::UnknownEmail);
    };

    let state = user.login_state();
    if let AccountStatus::Locked { until } = policy.status(&state, now) {
        return Ok(LoginOutcome::Locked { user_id: user.id, until });
    }

    if !password::verify(password.to_string(), user.password_hash.clone()).await {
        let outcome = policy.register_failure(&state, now);
        users::store_login_state(pool, user.id, &outcome.state).await?;
        return Ok(LoginOutcome::WrongPassword {
            user_id: user.id,
            attempts: outcome.state.failed_attempts,
            locked: outcome.locked,
        });
    }

    users::store_login_state(pool, user.id, &policy.register_success()).await?;
    Ok(LoginOutcome::Authenticated { user_id: user.id })
}

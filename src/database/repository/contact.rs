use chrono::NaiveDate;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::types::{ClientStatus, TaskPriority};
use crate::validation::contact::ContactSubmission;

pub const FOLLOW_UP_TITLE: &str = "Call back prospect";
pub const FOLLOW_UP_DESCRIPTION: &str = "Request received through the contact form.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRecord {
    pub client_id: i64,
    pub task_id: i64,
    /// The client row was new rather than updated
    pub new_client: bool,
}

/// Upsert the prospect by email and queue a follow-up task, atomically.
/// On an existing email only company, contact name and phone are overwritten.
pub async fn create(
    pool: &PgPool,
    submission: &ContactSubmission,
    follow_up_due: NaiveDate,
) -> Result<ContactRecord, DatabaseError> {
    let mut tx = pool.begin().await?;

    let (client_id, new_client) = sqlx::query_as::<_, (i64, bool)>(
        "INSERT INTO clients (company_name, contact_name, email, phone, status, source, notes)
         VALUES ($1, $2, $3, $4, $5, 'website', $6)
         ON CONFLICT (LOWER(email)) DO UPDATE
             SET company_name = EXCLUDED.company_name,
                 contact_name = EXCLUDED.contact_name,
                 phone = EXCLUDED.phone,
                 updated_at = NOW()
         RETURNING id, (xmax = 0) AS inserted",
    )
    .bind(submission.company.as_deref())
    .bind(&submission.name)
    .bind(&submission.email)
    .bind(submission.phone.as_deref())
    .bind(ClientStatus::Lead.as_str())
    .bind(submission.message.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    let task_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tasks (client_id, title, description, priority, due_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(client_id)
    .bind(FOLLOW_UP_TITLE)
    .bind(submission.message.as_deref().unwrap_or(FOLLOW_UP_DESCRIPTION))
    .bind(TaskPriority::High.as_str())
    .bind(follow_up_due)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ContactRecord {
        client_id,
        task_id,
        new_client,
    })
}

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{ClientSummary, OpenTask};
use crate::types::{InvoiceStatus, TaskStatus};

use super::tasks::PRIORITY_RANK;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub clients_active: i64,
    pub revenue_month: Decimal,
    pub invoices_pending: i64,
    pub projects_active: i64,
    pub recent_clients: Vec<ClientSummary>,
    pub tasks_todo: Vec<OpenTask>,
}

pub async fn stats(pool: &PgPool) -> Result<DashboardStats, DatabaseError> {
    let clients_active =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE status = 'active'")
            .fetch_one(pool)
            .await?;

    let revenue_month = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(amount), 0) FROM payments
         WHERE paid_at >= date_trunc('month', NOW())
           AND paid_at < date_trunc('month', NOW()) + INTERVAL '1 month'",
    )
    .fetch_one(pool)
    .await?;

    let invoices_pending =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE status = ANY($1)")
            .bind(names(InvoiceStatus::PENDING))
            .fetch_one(pool)
            .await?;

    let projects_active =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE status = 'active'")
            .fetch_one(pool)
            .await?;

    let recent_clients = sqlx::query_as::<_, ClientSummary>(
        "SELECT id, company_name, contact_name, email, status, created_at
         FROM clients ORDER BY created_at DESC, id DESC LIMIT 10",
    )
    .fetch_all(pool)
    .await?;

    let todo_sql = format!(
        "SELECT t.id, t.title, t.description, t.status, t.priority, t.due_at,
                c.contact_name AS client_name
         FROM tasks t
         LEFT JOIN clients c ON c.id = t.client_id
         WHERE t.status = ANY($1)
         ORDER BY {}, t.due_at ASC NULLS LAST, t.id ASC
         LIMIT 10",
        PRIORITY_RANK
    );
    let tasks_todo = sqlx::query_as::<_, OpenTask>(&todo_sql)
        .bind(names(TaskStatus::OPEN))
        .fetch_all(pool)
        .await?;

    Ok(DashboardStats {
        clients_active,
        revenue_month,
        invoices_pending,
        projects_active,
        recent_clients,
        tasks_todo,
    })
}

fn names<T: Copy + std::fmt::Display>(values: &[T]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

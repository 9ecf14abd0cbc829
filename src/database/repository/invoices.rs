use sqlx::{PgConnection, PgPool};

use crate::database::list_query::{Filters, Page};
use crate::database::manager::DatabaseError;
use crate::database::models::{Invoice, InvoiceDetail, InvoiceItem, Payment};
use crate::database::params::bind_query_as;
use crate::database::patch::{Column, PatchTable};
use crate::types::InvoiceStatus;
use crate::validation::invoice::{InvoiceInput, InvoiceItemInput};
use crate::validation::{parse_date, text, value};

const SELECT: &str = "SELECT i.id, i.client_id, i.reference, i.status, i.subtotal, i.tax_rate, \
                      i.tax_amount, i.total, i.issued_at, i.due_at, i.created_at, i.updated_at, \
                      c.contact_name, c.company_name \
                      FROM invoices i JOIN clients c ON c.id = i.client_id";

/// Single-invoice view; adds the client email
const DETAIL_SELECT: &str = "SELECT i.id, i.client_id, i.reference, i.status, i.subtotal, \
                             i.tax_rate, i.tax_amount, i.total, i.issued_at, i.due_at, \
                             i.created_at, i.updated_at, c.contact_name, c.company_name, c.email \
                             FROM invoices i JOIN clients c ON c.id = i.client_id";

pub const PATCH: PatchTable = PatchTable {
    table: "invoices",
    columns: &[
        Column::bigint("client_id"),
        Column::text("reference"),
        Column::text("status"),
        Column::numeric("subtotal"),
        Column::numeric("tax_rate"),
        Column::numeric("tax_amount"),
        Column::numeric("total"),
        Column::date("issued_at"),
        Column::date("due_at"),
    ],
    touch: Some("updated_at"),
};

pub async fn list(
    pool: &PgPool,
    status: Option<InvoiceStatus>,
    page: Page,
) -> Result<Vec<Invoice>, DatabaseError> {
    let mut filters = Filters::new();
    if let Some(status) = status {
        filters.eq("i.status", status.as_str());
    }
    let (tail, params) = filters.paged(page);
    let sql = format!(
        "{}{} ORDER BY i.created_at DESC, i.id DESC{}",
        SELECT,
        filters.where_clause(),
        tail
    );
    let invoices = bind_query_as(sqlx::query_as::<_, Invoice>(&sql), &params)
        .fetch_all(pool)
        .await?;
    Ok(invoices)
}

/// Invoice with client email, items in entry order and payments newest first
pub async fn find(pool: &PgPool, id: i64) -> Result<Option<InvoiceDetail>, DatabaseError> {
    let sql = format!("{} WHERE i.id = $1", DETAIL_SELECT);
    let Some(mut detail) = sqlx::query_as::<_, InvoiceDetail>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    detail.items = sqlx::query_as::<_, InvoiceItem>(
        "SELECT id, invoice_id, product_id, description, quantity, unit_price
         FROM invoice_items WHERE invoice_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    detail.payments = sqlx::query_as::<_, Payment>(
        "SELECT id, invoice_id, amount, paid_at, method
         FROM payments WHERE invoice_id = $1 ORDER BY paid_at DESC, id DESC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(detail))
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM invoices WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

pub async fn reference_taken(
    pool: &PgPool,
    reference: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM invoices
                       WHERE reference = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(reference.trim())
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// Insert the invoice row; omitted amounts and status take the column defaults
pub async fn insert(conn: &mut PgConnection, input: &InvoiceInput) -> Result<i64, DatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO invoices
             (client_id, reference, status, subtotal, tax_rate, tax_amount, total, issued_at, due_at)
         VALUES ($1, $2, COALESCE($3::TEXT, 'draft'), COALESCE($4::NUMERIC, 0),
                 COALESCE($5::NUMERIC, 7.70), COALESCE($6::NUMERIC, 0), COALESCE($7::NUMERIC, 0),
                 $8, $9)
         RETURNING id",
    )
    .bind(value(&input.client_id).copied())
    .bind(text(&input.reference))
    .bind(text(&input.status))
    .bind(value(&input.subtotal).copied())
    .bind(value(&input.tax_rate).copied())
    .bind(value(&input.tax_amount).copied())
    .bind(value(&input.total).copied())
    .bind(text(&input.issued_at).and_then(parse_date))
    .bind(text(&input.due_at).and_then(parse_date))
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn insert_items(
    conn: &mut PgConnection,
    invoice_id: i64,
    items: &[InvoiceItemInput],
) -> Result<(), DatabaseError> {
    for item in items {
        sqlx::query(
            "INSERT INTO invoice_items (invoice_id, product_id, description, quantity, unit_price)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(invoice_id)
        .bind(item.product_id)
        .bind(item.description.trim())
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Swap all line items of an invoice for `items`
pub async fn replace_items(
    conn: &mut PgConnection,
    invoice_id: i64,
    items: &[InvoiceItemInput],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
        .bind(invoice_id)
        .execute(&mut *conn)
        .await?;
    insert_items(conn, invoice_id, items).await
}

pub async fn touch(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE invoices SET updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Deletes the invoice and returns its reference
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<String>, DatabaseError> {
    let reference =
        sqlx::query_scalar::<_, String>("DELETE FROM invoices WHERE id = $1 RETURNING reference")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(reference)
}

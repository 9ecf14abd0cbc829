use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invoice with its client's display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub client_id: i64,
    pub reference: String,
    pub status: String,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub issued_at: Option<NaiveDate>,
    pub due_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub contact_name: String,
    pub company_name: Option<String>,
}

/// Single-invoice view: adds the client email, line items and payments
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub email: String,
    #[sqlx(skip)]
    pub items: Vec<InvoiceItem>,
    #[sqlx(skip)]
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: Option<i64>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub method: Option<String>,
}

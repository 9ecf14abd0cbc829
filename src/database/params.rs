use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{postgres::PgArguments, FromRow};

/// A typed, owned bind parameter for dynamically assembled statements
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(Option<String>),
    BigInt(Option<i64>),
    Numeric(Option<Decimal>),
    Date(Option<NaiveDate>),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        match self {
            SqlParam::Text(v) => v.is_none(),
            SqlParam::BigInt(v) => v.is_none(),
            SqlParam::Numeric(v) => v.is_none(),
            SqlParam::Date(v) => v.is_none(),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(Some(value.to_string()))
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::BigInt(Some(value))
    }
}

pub fn bind_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    params.iter().fold(q, |q, p| match p {
        SqlParam::Text(v) => q.bind(v.clone()),
        SqlParam::BigInt(v) => q.bind(*v),
        SqlParam::Numeric(v) => q.bind(*v),
        SqlParam::Date(v) => q.bind(*v),
    })
}

pub fn bind_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    params.iter().fold(q, |q, p| match p {
        SqlParam::Text(v) => q.bind(v.clone()),
        SqlParam::BigInt(v) => q.bind(*v),
        SqlParam::Numeric(v) => q.bind(*v),
        SqlParam::Date(v) => q.bind(*v),
    })
}

pub fn bind_query_scalar<'q, O>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>
where
    (O,): for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    params.iter().fold(q, |q, p| match p {
        SqlParam::Text(v) => q.bind(v.clone()),
        SqlParam::BigInt(v) => q.bind(*v),
        SqlParam::Numeric(v) => q.bind(*v),
        SqlParam::Date(v) => q.bind(*v),
    })
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

use super::params::SqlParam;

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Invalid value for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },
}

/// SQL type a mutable column binds as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    BigInt,
    Numeric,
    Date,
}

impl ColumnKind {
    fn describe(&self) -> &'static str {
        match self {
            ColumnKind::Text => "a string",
            ColumnKind::BigInt => "an integer",
            ColumnKind::Numeric => "a number",
            ColumnKind::Date => "a date (YYYY-MM-DD)",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text }
    }

    pub const fn bigint(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::BigInt }
    }

    pub const fn numeric(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Numeric }
    }

    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Date }
    }
}

/// A table and the ordered whitelist of columns the API may write
#[derive(Debug, Clone, Copy)]
pub struct PatchTable {
    pub table: &'static str,
    pub columns: &'static [Column],
    /// Column set to NOW() on every update
    pub touch: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
    /// Whitelisted columns present in the payload, in assignment order
    pub columns: Vec<&'static str>,
}

impl PatchTable {
    /// Build `UPDATE <table> SET ... WHERE id = $n` over the whitelisted keys in `payload`
    pub fn build(&self, payload: &Map<String, Value>, id: i64) -> Result<UpdateStatement, PatchError> {
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        let mut columns = Vec::new();

        for column in self.columns {
            let Some(value) = payload.get(column.name) else {
                continue;
            };
            params.push(convert(column, value)?);
            assignments.push(format!("{} = ${}", column.name, params.len()));
            columns.push(column.name);
        }

        if assignments.is_empty() {
            return Err(PatchError::NoFieldsToUpdate);
        }

        if let Some(touch) = self.touch {
            assignments.push(format!("{} = NOW()", touch));
        }

        params.push(SqlParam::BigInt(Some(id)));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${}",
            self.table,
            assignments.join(", "),
            params.len()
        );

        Ok(UpdateStatement { sql, params, columns })
    }
}

/// Convert one JSON value into the column's bind type; `null` always binds NULL
pub fn convert(column: &Column, value: &Value) -> Result<SqlParam, PatchError> {
    let invalid = || PatchError::InvalidValue {
        field: column.name.to_string(),
        expected: column.kind.describe(),
    };

    let param = match (column.kind, value) {
        (ColumnKind::Text, Value::Null) => SqlParam::Text(None),
        (ColumnKind::Text, Value::String(s)) if s.trim().is_empty() => SqlParam::Text(None),
        (ColumnKind::Text, Value::String(s)) => SqlParam::Text(Some(s.trim().to_string())),
        (ColumnKind::BigInt, Value::Null) => SqlParam::BigInt(None),
        (ColumnKind::BigInt, Value::Number(n)) => SqlParam::BigInt(Some(n.as_i64().ok_or_else(invalid)?)),
        (ColumnKind::BigInt, Value::String(s)) => {
            SqlParam::BigInt(Some(s.trim().parse().map_err(|_| invalid())?))
        }
        (ColumnKind::Numeric, Value::Null) => SqlParam::Numeric(None),
        (ColumnKind::Numeric, Value::Number(n)) => {
            SqlParam::Numeric(Some(Decimal::from_str(&n.to_string()).map_err(|_| invalid())?))
        }
        (ColumnKind::Numeric, Value::String(s)) => {
            SqlParam::Numeric(Some(Decimal::from_str(s.trim()).map_err(|_| invalid())?))
        }
        (ColumnKind::Date, Value::Null) => SqlParam::Date(None),
        (ColumnKind::Date, Value::String(s)) if s.trim().is_empty() => SqlParam::Date(None),
        (ColumnKind::Date, Value::String(s)) => SqlParam::Date(Some(
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| invalid())?,
        )),
        _ => return Err(invalid()),
    };

    Ok(param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ABC: PatchTable = PatchTable {
        table: "things",
        columns: &[Column::text("a"), Column::bigint("b"), Column::numeric("c")],
        touch: Some("updated_at"),
    };

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn assigns_in_whitelist_order() {
        let stmt = ABC.build(&object(json!({"c": 1, "a": "2"})), 7).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE things SET a = $1, c = $2, updated_at = NOW() WHERE id = $3"
        );
        assert_eq!(stmt.columns, vec!["a", "c"]);
        assert_eq!(stmt.params[0], SqlParam::Text(Some("2".to_string())));
        assert_eq!(stmt.params[1], SqlParam::Numeric(Some(Decimal::from(1))));
        assert_eq!(stmt.params[2], SqlParam::BigInt(Some(7)));
    }

    #[test]
    fn ignores_keys_outside_whitelist() {
        let stmt = ABC.build(&object(json!({"b": 3, "id": 99, "created_at": "x"})), 1).unwrap();
        assert_eq!(stmt.columns, vec!["b"]);
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn no_whitelisted_keys_is_an_error() {
        let err = ABC.build(&object(json!({"id": 5, "other": true})), 5).unwrap_err();
        assert_eq!(err, PatchError::NoFieldsToUpdate);
    }

    #[test]
    fn null_writes_null() {
        let stmt = ABC.build(&object(json!({"a": null})), 1).unwrap();
        assert!(stmt.params[0].is_null());
    }

    #[test]
    fn blank_text_writes_null() {
        let column = Column::text("phone");
        assert_eq!(convert(&column, &json!("   ")).unwrap(), SqlParam::Text(None));
        assert_eq!(
            convert(&column, &json!(" 079 ")).unwrap(),
            SqlParam::Text(Some("079".to_string()))
        );
    }

    #[test]
    fn rejects_wrong_types() {
        let err = ABC.build(&object(json!({"b": "seven"})), 1).unwrap_err();
        assert!(matches!(err, PatchError::InvalidValue { ref field, .. } if field == "b"));

        let err = ABC.build(&object(json!({"a": 12})), 1).unwrap_err();
        assert!(matches!(err, PatchError::InvalidValue { ref field, .. } if field == "a"));
    }

    #[test]
    fn converts_dates() {
        let column = Column::date("due_at");
        assert_eq!(
            convert(&column, &json!("2024-03-01")).unwrap(),
            SqlParam::Date(NaiveDate::from_ymd_opt(2024, 3, 1))
        );
        assert!(convert(&column, &json!("01/03/2024")).is_err());
    }

    #[test]
    fn without_touch_column() {
        let table = PatchTable { touch: None, ..ABC };
        let stmt = table.build(&object(json!({"a": "x"})), 2).unwrap();
        assert_eq!(stmt.sql, "UPDATE things SET a = $1 WHERE id = $2");
    }
}

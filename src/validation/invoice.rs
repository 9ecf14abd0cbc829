use rust_decimal::Decimal;
use serde::Deserialize;

use super::{
    amount_problem, present, Field, FieldErrors, Validator, MONEY_DIGITS, QUANTITY_DIGITS,
    RATE_DIGITS,
};
use crate::types::{InvoiceStatus, Mode};

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceInput {
    #[serde(default, deserialize_with = "present")]
    pub client_id: Field<i64>,
    #[serde(default, deserialize_with = "present")]
    pub reference: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub subtotal: Field<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub tax_rate: Field<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub tax_amount: Field<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub total: Field<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub issued_at: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_at: Field<String>,
    #[serde(default)]
    pub items: Option<Vec<InvoiceItemInput>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemInput {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

impl InvoiceInput {
    pub fn validate(&self, mode: Mode) -> FieldErrors {
        let mut v = Validator::new(mode);
        v.required_ref("client_id", &self.client_id)
            .required_text("reference", &self.reference, 50)
            .one_of(
                "status",
                &self.status,
                |s| InvoiceStatus::parse(s).is_some(),
                &InvoiceStatus::allowed(),
            )
            .amount("subtotal", &self.subtotal, MONEY_DIGITS)
            .amount("tax_rate", &self.tax_rate, RATE_DIGITS)
            .amount("tax_amount", &self.tax_amount, MONEY_DIGITS)
            .amount("total", &self.total, MONEY_DIGITS)
            .date("issued_at", &self.issued_at)
            .date("due_at", &self.due_at);

        for (i, item) in self.items.iter().flatten().enumerate() {
            if item.description.trim().is_empty() {
                v.error(&format!("items[{}].description", i), "Description is required");
            } else if item.description.trim().chars().count() > 255 {
                v.error(
                    &format!("items[{}].description", i),
                    "Description too long (max 255 characters)",
                );
            }
            if item.quantity <= Decimal::ZERO {
                v.error(&format!("items[{}].quantity", i), "Quantity must be greater than zero");
            } else if let Some(problem) = amount_problem(item.quantity, QUANTITY_DIGITS) {
                v.error(&format!("items[{}].quantity", i), format!("Quantity {}", problem));
            }
            if let Some(problem) = amount_problem(item.unit_price, MONEY_DIGITS) {
                v.error(&format!("items[{}].unit_price", i), format!("Unit price {}", problem));
            }
            if matches!(item.product_id, Some(id) if id <= 0) {
                v.error(&format!("items[{}].product_id", i), "Product ID is invalid");
            }
        }

        v.into_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> InvoiceInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_requires_client_and_reference() {
        let errors = input(json!({})).validate(Mode::Create);
        assert_eq!(errors["client_id"], "Client ID is required");
        assert_eq!(errors["reference"], "Reference is required");
    }

    #[test]
    fn accepts_amounts_as_strings_or_numbers() {
        let parsed = input(json!({
            "client_id": 1,
            "reference": "F-2024-001",
            "subtotal": "100.00",
            "tax_rate": 7.7,
            "items": [{"description": "Website", "unit_price": "100.00"}]
        }));
        assert!(parsed.validate(Mode::Create).is_empty());
        assert_eq!(parsed.subtotal, Some(Some(Decimal::new(10000, 2))));
        let items = parsed.items.unwrap();
        assert_eq!(items[0].quantity, Decimal::ONE);
    }

    #[test]
    fn rejects_negative_amounts_and_bad_items() {
        let errors = input(json!({
            "total": "-5",
            "status": "void",
            "due_at": "tomorrow",
            "items": [{"description": "", "quantity": 0}]
        }))
        .validate(Mode::Update);
        assert!(errors.contains_key("total"));
        assert!(errors.contains_key("status"));
        assert!(errors.contains_key("due_at"));
        assert!(errors.contains_key("items[0].description"));
        assert!(errors.contains_key("items[0].quantity"));
        assert!(!errors.contains_key("client_id"));
    }

    #[test]
    fn rejects_amounts_too_large_for_their_columns() {
        let errors = input(json!({
            "tax_rate": 1000,
            "total": "10000000000",
            "items": [{"description": "Bulk", "quantity": "100000000000", "unit_price": "1.005"}]
        }))
        .validate(Mode::Update);
        assert_eq!(errors["tax_rate"], "Tax rate must be less than 1000");
        assert_eq!(errors["total"], "Total must be less than 10000000000");
        assert_eq!(errors["items[0].quantity"], "Quantity must be less than 100000000");
        assert_eq!(
            errors["items[0].unit_price"],
            "Unit price must have at most 2 decimal places"
        );
    }
}

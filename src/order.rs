// keydrop/src/order.rs
// PayPal order payload & purchase classification

use serde::{Deserialize, Serialize};

use crate::error::{FulfillmentError, Result};

/// Provider status value for a captured order
pub const COMPLETED_STATUS: &str = "COMPLETED";

const MAX_ORDER_ID_LEN: usize = 64;

/// Marker carried by masterclass SKUs/item names (matched case-insensitively)
const MASTERCLASS_MARKER: &str = "masterclass";

// ═══════════════════════════════════════════════════════════════════════════════
// ORDER TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Subset of the PayPal v2 checkout order resource that fulfillment reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub payer: Option<Payer>,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
}

// Every payer field is optional upstream; presence is checked in `summary()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default)]
    pub name: Option<PayerName>,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerName {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amount {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
}

/// Who paid and how much, pulled from a completed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseSummary {
    pub payer_name: String,
    pub payer_email: String,
    pub amount: String,
    pub currency: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRODUCT CATEGORY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Masterclass,
    Standard,
}

impl ProductCategory {
    /// Wording used when the key pool for this category runs dry
    pub fn pool_label(&self) -> &'static str {
        match self {
            ProductCategory::Masterclass => "Masterclass",
            ProductCategory::Standard => "other products",
        }
    }
}

/// Order ids are short runs of ASCII letters, digits, `-` and `_`.
pub fn is_valid_order_id(order_id: &str) -> bool {
    !order_id.is_empty()
        && order_id.len() <= MAX_ORDER_ID_LEN
        && order_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn required<'a>(value: Option<&'a String>, field: &str) -> Result<&'a String> {
    value.ok_or_else(|| FulfillmentError::MalformedOrder(format!("missing {}", field)))
}

impl Order {
    /// Fails unless the provider reports the order as captured.
    pub fn ensure_completed(self) -> Result<Self> {
        if self.status == COMPLETED_STATUS {
            Ok(self)
        } else {
            Err(FulfillmentError::OrderNotCompleted {
                status: self.status,
            })
        }
    }

    /// Items of the first purchase unit; PayPal checkout orders carry one.
    pub fn items(&self) -> &[Item] {
        self.purchase_units
            .first()
            .map(|unit| unit.items.as_slice())
            .unwrap_or_default()
    }

    /// Lowercased SKUs in item order
    pub fn skus(&self) -> Vec<String> {
        self.items().iter().map(|i| i.sku.to_lowercase()).collect()
    }

    pub fn category(&self) -> ProductCategory {
        let is_masterclass = self.items().iter().any(|item| {
            item.sku.to_lowercase().contains(MASTERCLASS_MARKER)
                || item.name.to_lowercase().contains(MASTERCLASS_MARKER)
        });

        if is_masterclass {
            ProductCategory::Masterclass
        } else {
            ProductCategory::Standard
        }
    }

    pub fn summary(&self) -> Result<PurchaseSummary> {
        let payer = self
            .payer
            .as_ref()
            .ok_or_else(|| FulfillmentError::MalformedOrder("missing payer".into()))?;
        let name = payer
            .name
            .as_ref()
            .ok_or_else(|| FulfillmentError::MalformedOrder("missing payer name".into()))?;
        let amount = self
            .purchase_units
            .first()
            .and_then(|unit| unit.amount.as_ref())
            .ok_or_else(|| FulfillmentError::MalformedOrder("missing purchase amount".into()))?;

        Ok(PurchaseSummary {
            payer_name: format!(
                "{} {}",
                required(name.given_name.as_ref(), "payer given_name")?,
                required(name.surname.as_ref(), "payer surname")?
            ),
            payer_email: required(payer.email_address.as_ref(), "payer email_address")?.clone(),
            amount: amount.value.clone(),
            currency: amount.currency_code.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_with_items(items: serde_json::Value) -> Order {
        serde_json::from_value(json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "payer": {
                "name": { "given_name": "Jane", "surname": "Doe" },
                "email_address": "jane@example.com"
            },
            "purchase_units": [{
                "amount": { "currency_code": "USD", "value": "19.99" },
                "items": items
            }]
        }))
        .unwrap()
    }

    #[test]
    fn parses_paypal_payload_and_summarizes() {
        let order = order_with_items(json!([{ "sku": "ar_pack", "name": "AR Pack" }]));
        let summary = order.summary().unwrap();

        assert_eq!(summary.payer_name, "Jane Doe");
        assert_eq!(summary.payer_email, "jane@example.com");
        assert_eq!(summary.amount, "19.99");
        assert_eq!(summary.currency, "USD");
        assert_eq!(order.skus(), vec!["ar_pack".to_string()]);
    }

    #[test]
    fn masterclass_detected_by_sku_or_name_case_insensitive() {
        let by_sku = order_with_items(json!([{ "sku": "AIM_MASTERCLASS", "name": "Aim" }]));
        let by_name = order_with_items(json!([
            { "sku": "ar_pack", "name": "AR Pack" },
            { "sku": "course_01", "name": "Editing MasterClass" }
        ]));
        let standard = order_with_items(json!([{ "sku": "smg_pack", "name": "SMG Pack" }]));

        assert_eq!(by_sku.category(), ProductCategory::Masterclass);
        assert_eq!(by_name.category(), ProductCategory::Masterclass);
        assert_eq!(standard.category(), ProductCategory::Standard);
    }

    #[test]
    fn order_without_items_is_standard() {
        let order: Order = serde_json::from_value(json!({
            "id": "X",
            "status": "COMPLETED",
            "purchase_units": [{ "amount": { "currency_code": "EUR", "value": "5.00" } }]
        }))
        .unwrap();

        assert!(order.items().is_empty());
        assert_eq!(order.category(), ProductCategory::Standard);
    }

    #[test]
    fn non_completed_status_is_rejected() {
        let mut order = order_with_items(json!([]));
        order.status = "APPROVED".into();

        match order.ensure_completed() {
            Err(FulfillmentError::OrderNotCompleted { status }) => assert_eq!(status, "APPROVED"),
            other => panic!("expected OrderNotCompleted, got {:?}", other),
        }
    }

    #[test]
    fn missing_payer_is_malformed() {
        let order: Order = serde_json::from_value(json!({
            "id": "X",
            "status": "COMPLETED",
            "purchase_units": []
        }))
        .unwrap();

        assert!(matches!(order.summary(), Err(FulfillmentError::MalformedOrder(_))));
    }

    #[test]
    fn partial_payer_on_pending_order_still_reports_not_completed() {
        let order: Order = serde_json::from_value(json!({
            "id": "8AB12345CD678901E",
            "status": "APPROVED",
            "payer": { "email_address": "a@b.c" },
            "purchase_units": [{ "amount": { "currency_code": "USD", "value": "19.99" } }]
        }))
        .unwrap();

        assert!(matches!(
            order.ensure_completed(),
            Err(FulfillmentError::OrderNotCompleted { .. })
        ));
    }

    #[test]
    fn completed_order_with_partial_payer_is_malformed() {
        let order: Order = serde_json::from_value(json!({
            "id": "X",
            "status": "COMPLETED",
            "payer": { "name": { "given_name": "Jane" }, "email_address": "jane@example.com" },
            "purchase_units": [{ "amount": { "currency_code": "USD", "value": "19.99" } }]
        }))
        .unwrap();

        match order.summary() {
            Err(FulfillmentError::MalformedOrder(msg)) => assert_eq!(msg, "missing payer surname"),
            other => panic!("expected MalformedOrder, got {:?}", other),
        }
    }

    #[test]
    fn order_id_validation() {
        assert!(is_valid_order_id("5O190127TN364715T"));
        assert!(is_valid_order_id("ORDER-1"));
        assert!(!is_valid_order_id(""));
        assert!(!is_valid_order_id("../../v1/reporting/transactions?x="));
        assert!(!is_valid_order_id("abc/def"));
        assert!(!is_valid_order_id(&"A".repeat(65)));
    }
}

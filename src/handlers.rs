// keydrop/src/handlers.rs
// HTTP entry points

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::FulfillmentError;
use crate::fulfillment::FulfillmentState;
use crate::notify::NotificationReport;
use crate::order::{is_valid_order_id, ProductCategory};

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "orderId", default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub order_id: String,
    pub category: ProductCategory,
    pub notifications: NotificationReport,
}

/// POST /verify-paypal-payment
pub async fn verify_payment_handler(
    State(state): State<Arc<FulfillmentState>>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Response {
    let order_id = match payload {
        Ok(Json(VerifyPaymentRequest {
            order_id: Some(id),
        })) if !id.trim().is_empty() => id,
        Ok(_) => return FulfillmentError::Validation("Missing orderId".into()).into_response(),
        Err(rejection) => {
            tracing::warn!("[VERIFY] rejected body: {}", rejection.body_text());
            return FulfillmentError::Validation("Missing orderId".into()).into_response();
        }
    };

    let order_id = order_id.trim();
    if !is_valid_order_id(order_id) {
        tracing::warn!("[VERIFY] rejected malformed orderId {:?}", order_id);
        return FulfillmentError::Validation("Invalid orderId".into()).into_response();
    }

    match state.fulfill(order_id).await {
        Ok(receipt) => Json(VerifyPaymentResponse {
            status: "success",
            message: "Payment verified, SMS and email sent",
            order_id: receipt.order_id,
            category: receipt.category,
            notifications: receipt.notifications,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(order_id = %order_id, "[VERIFY] ❌ {:?}", e);
            e.into_response()
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

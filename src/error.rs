// keydrop/src/error.rs
// Fulfillment error taxonomy & HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::notify::NotificationReport;
use crate::order::ProductCategory;

pub type Result<T> = std::result::Result<T, FulfillmentError>;

/// Every way a single fulfillment run can fail.
#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("{0}")]
    Validation(String),

    /// Key pool resource unreachable or non-success status
    #[error("Failed to fetch keys list: {0}")]
    Fetch(String),

    #[error("PayPal auth failed: {0}")]
    Auth(String),

    #[error("Order lookup failed: {0}")]
    OrderFetch(String),

    #[error("Order payload incomplete: {0}")]
    MalformedOrder(String),

    #[error("Order not completed")]
    OrderNotCompleted { status: String },

    #[error("No unused keys available for {}", .category.pool_label())]
    NoKeyAvailable { category: ProductCategory },

    #[error("Notification failed: {}", .0.failure_summary())]
    Notification(NotificationReport),
}

impl FulfillmentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FulfillmentError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationReport>,
}

impl IntoResponse for FulfillmentError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut message = self.to_string();
        if message.trim().is_empty() {
            message = "Verification failed".to_string();
        }

        let notifications = match self {
            FulfillmentError::Notification(report) => Some(report),
            _ => None,
        };

        let body = ErrorBody {
            status: "error",
            message,
            notifications,
        };

        (status, Json(body)).into_response()
    }
}

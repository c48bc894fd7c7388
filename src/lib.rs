//! Payment-confirmation webhook: verifies a PayPal order, hands out a license
//! key from the remote pool and notifies the operator (SMS) and buyer (email).

pub mod catalog;
pub mod config;
pub mod error;
pub mod fulfillment;
pub mod handlers;
pub mod keys;
pub mod notify;
pub mod order;
pub mod paypal;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{FulfillmentError, Result};
pub use fulfillment::{FulfillmentReceipt, FulfillmentState};

pub fn app(state: Arc<FulfillmentState>) -> Router {
    Router::new()
        .route("/verify-paypal-payment", post(handlers::verify_payment_handler))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// keydrop/src/paypal.rs
// PayPal client-credentials auth & order lookup

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::PayPalConfig;
use crate::error::{FulfillmentError, Result};
use crate::order::Order;

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const MAX_TOKEN_TTL_SECS: i64 = 86_400;

// ═══════════════════════════════════════════════════════════════════════════════
// ORDER GATEWAY
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Fetch the provider's current view of an order.
    async fn fetch_order(&self, order_id: &str) -> Result<Order>;
}

/// Look an order up and insist it has been captured.
pub async fn verify_order(gateway: &dyn OrderGateway, order_id: &str) -> Result<Order> {
    let order = gateway.fetch_order(order_id).await?;
    tracing::info!(order_id, status = %order.status, "[PAYPAL] order fetched");
    order.ensure_completed()
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYPAL CLIENT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

pub struct PayPalClient {
    config: PayPalConfig,
    http_client: Client,
    auth_token: RwLock<Option<(String, DateTime<Utc>)>>,
}

impl PayPalClient {
    pub fn new(config: PayPalConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
            auth_token: RwLock::new(None),
        }
    }

    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Get valid access token (cached or refreshed)
    pub async fn access_token(&self) -> Result<String> {
        {
            let token_lock = self.auth_token.read().await;
            if let Some((token, expiry)) = &*token_lock {
                if *expiry > Utc::now() {
                    return Ok(token.clone());
                }
            }
        }

        let url = format!("{}/v1/oauth2/token", self.config.base_url());
        let params = [("grant_type", "client_credentials")];

        let resp = self
            .http_client
            .post(&url)
            .header("Authorization", self.basic_auth())
            .form(&params)
            .send()
            .await
            .map_err(|e| FulfillmentError::Auth(format!("request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(FulfillmentError::Auth(format!("status {}", resp.status())));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| FulfillmentError::Auth(format!("JSON error: {}", e)))?;

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FulfillmentError::Auth("no access_token field".into()))?;
        let expires_in = body
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS)
            .clamp(TOKEN_REFRESH_MARGIN_SECS, MAX_TOKEN_TTL_SECS);

        let mut token_lock = self.auth_token.write().await;
        *token_lock = Some((
            access_token.clone(),
            Utc::now() + Duration::seconds(expires_in - TOKEN_REFRESH_MARGIN_SECS),
        ));

        tracing::debug!("[PAYPAL] access token refreshed, valid for {}s", expires_in);

        Ok(access_token)
    }

    /// `{base}/v2/checkout/orders/{id}` with the id kept as one escaped segment.
    fn order_url(&self, order_id: &str) -> Result<Url> {
        let mut url = Url::parse(self.config.base_url())
            .map_err(|e| FulfillmentError::OrderFetch(format!("bad API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FulfillmentError::OrderFetch("API base cannot hold a path".into()))?
            .pop_if_empty()
            .extend(["v2", "checkout", "orders", order_id]);
        Ok(url)
    }
}

#[async_trait]
impl OrderGateway for PayPalClient {
    async fn fetch_order(&self, order_id: &str) -> Result<Order> {
        let access_token = self.access_token().await?;
        let url = self.order_url(order_id)?;

        let resp = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| FulfillmentError::OrderFetch(format!("request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(FulfillmentError::OrderFetch(format!("status {}", resp.status())));
        }

        resp.json::<Order>()
            .await
            .map_err(|e| FulfillmentError::OrderFetch(format!("JSON error: {}", e)))
    }
}

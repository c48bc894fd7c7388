// keydrop/src/fulfillment.rs
// Verify -> allocate -> notify, one run per request

use std::sync::Arc;

use reqwest::Client;
use tracing::Instrument;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::{FulfillmentError, Result};
use crate::keys::{HttpKeySource, KeyAllocator};
use crate::notify::{EmailJsClient, EmailMessage, NotificationReport, Notifier, TwilioSms};
use crate::order::ProductCategory;
use crate::paypal::{verify_order, OrderGateway, PayPalClient};

/// Outcome of a fully successful run
#[derive(Debug, Clone)]
pub struct FulfillmentReceipt {
    pub order_id: String,
    pub category: ProductCategory,
    pub notifications: NotificationReport,
}

#[derive(Clone)]
pub struct FulfillmentState {
    pub gateway: Arc<dyn OrderGateway>,
    pub allocator: Arc<KeyAllocator>,
    pub catalog: Arc<Catalog>,
    pub notifier: Notifier,
}

impl FulfillmentState {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        allocator: Arc<KeyAllocator>,
        catalog: Catalog,
        notifier: Notifier,
    ) -> Self {
        Self {
            gateway,
            allocator,
            catalog: Arc::new(catalog),
            notifier,
        }
    }

    /// Production wiring: PayPal, remote key pool, Twilio and EmailJS over one HTTP client.
    pub fn from_config(config: &AppConfig) -> Self {
        let http_client = Client::new();

        let gateway = Arc::new(PayPalClient::new(config.paypal.clone(), http_client.clone()));
        let source = Arc::new(HttpKeySource::new(
            config.key_pool_url.clone(),
            http_client.clone(),
        ));
        let allocator = Arc::new(KeyAllocator::new(source, config.claim_mode));
        let notifier = Notifier::new(
            Arc::new(TwilioSms::new(config.twilio.clone(), http_client.clone())),
            Arc::new(EmailJsClient::new(config.emailjs.clone(), http_client)),
        );

        Self::new(gateway, allocator, Catalog::default(), notifier)
    }

    pub async fn fulfill(&self, order_id: &str) -> Result<FulfillmentReceipt> {
        let span = tracing::info_span!(
            "fulfill",
            request_id = %Uuid::new_v4(),
            order_id = %order_id
        );
        self.run(order_id).instrument(span).await
    }

    async fn run(&self, order_id: &str) -> Result<FulfillmentReceipt> {
        let order = verify_order(self.gateway.as_ref(), order_id).await?;
        let summary = order.summary()?;
        let category = order.category();

        tracing::info!(?category, "[FULFILL] order verified for {}", summary.payer_email);

        let purchase_key = self.allocator.claim(category).await?;
        let links = self.catalog.download_links(&order, category);

        let message = EmailMessage {
            to_email: summary.payer_email.clone(),
            name: summary.payer_name.clone(),
            purchase_key,
            download_link: links.email_text(),
        };

        // A failed notification keeps the claimed key; nothing is rolled back.
        let notifications = self.notifier.notify(&summary, &message).await;
        if !notifications.all_sent() {
            return Err(FulfillmentError::Notification(notifications));
        }

        tracing::info!("[FULFILL] ✅ key delivered, SMS and email sent");

        Ok(FulfillmentReceipt {
            order_id: order.id,
            category,
            notifications,
        })
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keydrop_payment_backend::catalog::Catalog;
use keydrop_payment_backend::keys::{parse_key_list, ClaimMode, KeyAllocator, KeySource};
use keydrop_payment_backend::notify::{
    ChannelError, ChannelResult, EmailMessage, EmailSender, Notifier, SmsSender,
};
use keydrop_payment_backend::order::Order;
use keydrop_payment_backend::paypal::OrderGateway;
use keydrop_payment_backend::{FulfillmentError, FulfillmentState, Result};
use serde_json::{json, Value};

pub const KEY_POOL: &str = "STD-0001\nMasterclass-0001\nSTD-0002\n";

pub fn order_json(status: &str, items: Value) -> Value {
    json!({
        "id": "ORDER-1",
        "status": status,
        "payer": {
            "name": { "given_name": "Jane", "surname": "Doe" },
            "email_address": "jane@example.com"
        },
        "purchase_units": [{
            "amount": { "currency_code": "USD", "value": "19.99" },
            "items": items
        }]
    })
}

#[derive(Default)]
pub struct FakeGateway {
    pub orders: HashMap<String, Value>,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    pub fn with_order(order_id: &str, order: Value) -> Self {
        let mut orders = HashMap::new();
        orders.insert(order_id.to_string(), order);
        Self {
            orders,
            ..Default::default()
        }
    }
}

#[async_trait]
impl OrderGateway for FakeGateway {
    async fn fetch_order(&self, order_id: &str) -> Result<Order> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = self
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| FulfillmentError::OrderFetch("status 404 Not Found".into()))?;
        serde_json::from_value(value).map_err(|e| FulfillmentError::OrderFetch(e.to_string()))
    }
}

pub struct FakeKeys {
    pub keys: Vec<String>,
    pub fetches: AtomicUsize,
}

#[async_trait]
impl KeySource for FakeKeys {
    async fn fetch_keys(&self) -> Result<Vec<String>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.clone())
    }
}

#[derive(Default)]
pub struct FakeSms {
    pub fail: bool,
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl SmsSender for FakeSms {
    async fn send_sms(&self, body: &str) -> ChannelResult {
        if self.fail {
            return Err(ChannelError("Twilio failed: 500".into()));
        }
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEmail {
    pub fail: bool,
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl EmailSender for FakeEmail {
    async fn send_email(&self, message: &EmailMessage) -> ChannelResult {
        if self.fail {
            return Err(ChannelError("EmailJS failed: 400 The template ID is invalid".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct Harness {
    pub state: Arc<FulfillmentState>,
    pub gateway: Arc<FakeGateway>,
    pub keys: Arc<FakeKeys>,
    pub allocator: Arc<KeyAllocator>,
    pub sms: Arc<FakeSms>,
    pub email: Arc<FakeEmail>,
}

pub fn harness(gateway: FakeGateway, sms: FakeSms, email: FakeEmail) -> Harness {
    let gateway = Arc::new(gateway);
    let keys = Arc::new(FakeKeys {
        keys: parse_key_list(KEY_POOL),
        fetches: AtomicUsize::new(0),
    });
    let allocator = Arc::new(KeyAllocator::new(keys.clone(), ClaimMode::Atomic));
    let sms = Arc::new(sms);
    let email = Arc::new(email);

    let state = Arc::new(FulfillmentState::new(
        gateway.clone(),
        allocator.clone(),
        Catalog::default(),
        Notifier::new(sms.clone(), email.clone()),
    ));

    Harness {
        state,
        gateway,
        keys,
        allocator,
        sms,
        email,
    }
}

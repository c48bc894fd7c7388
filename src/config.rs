// keydrop/src/config.rs
// Environment-driven configuration

use crate::keys::ClaimMode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_KEY_POOL_URL: &str =
    "https://raw.githubusercontent.com/Malik-2-Wavy/Pc-Keys/refs/heads/main/Keys";

fn env_or(name: &str, fallback: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| fallback.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYPAL
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub mode: String, // "sandbox" or "live"
    /// Overrides the mode-derived API host
    pub api_base: Option<String>,
}

impl PayPalConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: env_or("PAYPAL_CLIENT_ID", "sb_client_id_placeholder"),
            client_secret: env_or("PAYPAL_CLIENT_SECRET", "sb_client_secret_placeholder"),
            mode: env_or("PAYPAL_MODE", "sandbox"),
            api_base: std::env::var("PAYPAL_API_BASE").ok(),
        }
    }

    pub fn base_url(&self) -> &str {
        if let Some(base) = &self.api_base {
            base.trim_end_matches('/')
        } else if self.mode == "live" {
            "https://api-m.paypal.com"
        } else {
            "https://api-m.sandbox.paypal.com"
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TWILIO (operator SMS)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub operator_number: String,
}

impl TwilioConfig {
    pub fn from_env() -> Self {
        Self {
            account_sid: env_or("TWILIO_ACCOUNT_SID", "AC_placeholder"),
            auth_token: env_or("TWILIO_AUTH_TOKEN", "auth_token_placeholder"),
            from_number: env_or("TWILIO_PHONE_NUMBER", ""),
            operator_number: env_or("MY_PHONE_NUMBER", ""),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EMAILJS (purchaser email)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl EmailJsConfig {
    pub fn from_env() -> Self {
        Self {
            service_id: env_or("EMAILJS_SERVICE_ID", "service_placeholder"),
            template_id: env_or("EMAILJS_TEMPLATE_ID", "template_placeholder"),
            public_key: env_or("EMAILJS_PUBLIC_KEY", "public_key_placeholder"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// APP
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub key_pool_url: String,
    pub claim_mode: ClaimMode,
    pub paypal: PayPalConfig,
    pub twilio: TwilioConfig,
    pub emailjs: EmailJsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let claim_mode = match std::env::var("KEY_CLAIM_MODE") {
            Ok(raw) => ClaimMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown KEY_CLAIM_MODE {:?}, using atomic", raw);
                ClaimMode::Atomic
            }),
            Err(_) => ClaimMode::default(),
        };

        Self {
            port,
            key_pool_url: env_or("KEY_POOL_URL", DEFAULT_KEY_POOL_URL),
            claim_mode,
            paypal: PayPalConfig::from_env(),
            twilio: TwilioConfig::from_env(),
            emailjs: EmailJsConfig::from_env(),
        }
    }
}

//! Configuration for the webhook API service.

use std::time::Duration;

use subhook_billing_core::BillingConfig;

/// Webhook API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Billing core configuration
    pub billing: BillingConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
    /// Apply database migrations on start-up
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Database
        let database_url = required("DATABASE_URL")?;

        // Server
        let http_port = or_default("HTTP_PORT", "3000")
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Stripe configuration
        let stripe_secret_key = required("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = required("STRIPE_WEBHOOK_SECRET")?;
        if stripe_webhook_secret.is_empty() {
            return Err(ConfigError::Invalid("STRIPE_WEBHOOK_SECRET"));
        }

        let stripe_api_base = or_default(
            "STRIPE_API_BASE",
            subhook_billing_core::config::DEFAULT_STRIPE_API_BASE,
        );

        // 0 disables the timestamp check
        let tolerance_secs: u64 = or_default("WEBHOOK_TOLERANCE_SECS", "300")
            .parse()
            .map_err(|_| ConfigError::Invalid("WEBHOOK_TOLERANCE_SECS"))?;
        let webhook_tolerance = (tolerance_secs > 0).then(|| Duration::from_secs(tolerance_secs));

        // Request timeout
        let request_timeout_secs: u64 = or_default("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        let metrics_enabled = or_default("METRICS_ENABLED", "true")
            .parse()
            .unwrap_or(true);

        let run_migrations = or_default("RUN_MIGRATIONS", "true")
            .parse()
            .unwrap_or(true);

        let billing = BillingConfig::new(stripe_secret_key, stripe_webhook_secret)
            .with_api_base(stripe_api_base)
            .with_tolerance(webhook_tolerance);

        Ok(Self {
            http_port,
            database_url,
            billing,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
            run_migrations,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PRODUCTS_KEY: &str = "products";
const DEFAULT_COMMENTS_KEY: &str = "comments";
const DEFAULT_CART_KEY: &str = "cart";
const DEFAULT_ORDERS_KEY: &str = "orders";
const DEFAULT_SESSION_KEY: &str = "user";
const DEFAULT_NOTIFICATION_SERVICE_ID: &str = "service_ag0q3rf";
const DEFAULT_NOTIFICATION_TEMPLATE_ID: &str = "template_9rck5vp";
const DEFAULT_NOTIFICATION_PUBLIC_KEY: &str = "oXnkMWFTKlt7ulqxi";
const CONFIG_FILE: &str = "config/agromarket";
const ENV_PREFIX: &str = "AGROMARKET";

/// Storage key under which each persistent collection lives.
///
/// The defaults match the keys the storefront has always used, so an embedder
/// pointed at existing data picks it up without migration.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct StorageKeys {
    #[validate(length(min = 1))]
    pub products: String,

    #[validate(length(min = 1))]
    pub comments: String,

    #[validate(length(min = 1))]
    pub cart: String,

    #[validate(length(min = 1))]
    pub orders: String,

    /// Key holding the current session identity.
    #[validate(length(min = 1))]
    pub session: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            products: DEFAULT_PRODUCTS_KEY.to_string(),
            comments: DEFAULT_COMMENTS_KEY.to_string(),
            cart: DEFAULT_CART_KEY.to_string(),
            orders: DEFAULT_ORDERS_KEY.to_string(),
            session: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

/// Identifiers for the external mail relay that delivers order receipts.
///
/// The defaults are the relay ids the storefront has always dispatched
/// receipts through; embedders with their own relay account override them.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    #[validate(length(min = 1))]
    pub service_id: String,

    #[validate(length(min = 1))]
    pub template_id: String,

    #[validate(length(min = 1))]
    pub public_key: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            service_id: DEFAULT_NOTIFICATION_SERVICE_ID.to_string(),
            template_id: DEFAULT_NOTIFICATION_TEMPLATE_ID.to_string(),
            public_key: DEFAULT_NOTIFICATION_PUBLIC_KEY.to_string(),
        }
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    #[validate]
    pub storage: StorageKeys,

    #[validate]
    pub notifications: NotificationConfig,

    /// Fallback log filter when RUST_LOG is not set.
    #[validate(length(min = 1))]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKeys::default(),
            notifications: NotificationConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `config/agromarket.*` (optional) and
    /// `AGROMARKET_*` environment variables, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;
        Ok(app)
    }
}

//! Outbound order receipt dispatch.
//!
//! The order service sends a receipt after every commit, fire-and-forget: a
//! delivery failure is surfaced to the caller as a warning on the checkout
//! receipt and never rolls back the order.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::NotificationConfig;
use crate::entities::{Identity, Order};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// The fields handed to the mail relay, matching the storefront's receipt
/// template.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub total: Decimal,
}

impl OrderReceipt {
    pub fn new(buyer: &Identity, order: &Order) -> Self {
        Self {
            order_id: order.id,
            full_name: buyer.name.clone(),
            email: buyer.email.clone(),
            phone: order.phone.clone(),
            address: order.address.clone(),
            total: order.total,
        }
    }
}

/// Dispatches an order receipt to the buyer.
pub trait NotificationSender: Send + Sync {
    fn send(&self, receipt: &OrderReceipt) -> Result<(), NotificationError>;
}

/// Default sender: logs the receipt instead of dispatching it. Embedders with
/// a real mail relay supply their own [`NotificationSender`] built from the
/// same [`NotificationConfig`].
#[derive(Debug, Default, Clone)]
pub struct LogSender {
    config: NotificationConfig,
}

impl LogSender {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl NotificationSender for LogSender {
    fn send(&self, receipt: &OrderReceipt) -> Result<(), NotificationError> {
        info!(
            service_id = %self.config.service_id,
            template_id = %self.config.template_id,
            order_id = %receipt.order_id,
            email = %receipt.email,
            total = %receipt.total,
            "order receipt (log-only sender)"
        );
        Ok(())
    }
}

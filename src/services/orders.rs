use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::IdentityProvider;
use crate::config::AppConfig;
use crate::entities::{Order, OrderLine};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::cart::CartService;
use crate::services::notifications::{NotificationSender, OrderReceipt};
use crate::storage::{self, KeyValueStore};

/// Order service: converts the cart into immutable order records.
///
/// An order has exactly two states: the draft that is the live cart, and the
/// committed record produced here. There is no cancellation or fulfillment
/// tracking.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityProvider>,
    cart: Arc<CartService>,
    notifier: Arc<dyn NotificationSender>,
    events: Arc<EventSender>,
    orders_key: String,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityProvider>,
        cart: Arc<CartService>,
        notifier: Arc<dyn NotificationSender>,
        events: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            identity,
            cart,
            notifier,
            events,
            orders_key: config.storage.orders.clone(),
        }
    }

    /// Commits the current cart as an immutable order.
    ///
    /// Rejected before any mutation when no identity is set, the cart is
    /// empty, or the shipping fields are blank. On success the order is
    /// appended to the buyer's history, the receipt notification is sent
    /// fire-and-forget (a delivery failure is reported on the returned
    /// receipt, never rolled back), and the cart is cleared.
    #[instrument(skip(self, input))]
    pub fn commit(&self, input: CheckoutInput) -> Result<CheckoutReceipt, ServiceError> {
        let buyer = self.identity.current_identity()?.ok_or_else(|| {
            ServiceError::ValidationError(
                "an identity must be set before checking out".to_string(),
            )
        })?;
        input.validate()?;

        let items = self.cart.items()?;
        if items.is_empty() {
            return Err(ServiceError::ValidationError("cart is empty".to_string()));
        }

        let lines: Vec<OrderLine> = items
            .iter()
            .map(|item| OrderLine {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.price,
                line_total: item.line_total(),
            })
            .collect();
        // Same saturating rule as the cart total: never panic on overflow.
        let total = lines
            .iter()
            .map(|line| line.line_total)
            .fold(Decimal::ZERO, |acc, line| {
                acc.checked_add(line).unwrap_or(Decimal::MAX)
            });

        let order = Order {
            id: Uuid::new_v4(),
            buyer_id: buyer.id,
            buyer_name: buyer.name.clone(),
            address: input.address,
            phone: input.phone,
            total,
            items: lines,
            created_at: Utc::now(),
        };

        let mut orders: Vec<Order> = storage::read_collection(&*self.store, &self.orders_key)?;
        orders.push(order.clone());
        storage::write_collection(&*self.store, &self.orders_key, &orders)?;

        let receipt = OrderReceipt::new(&buyer, &order);
        let notification = match self.notifier.send(&receipt) {
            Ok(()) => NotificationStatus::Sent,
            Err(err) => {
                warn!(order_id = %order.id, %err, "receipt notification failed");
                NotificationStatus::Failed(err.to_string())
            }
        };

        self.cart.clear()?;
        self.events.send_or_log(Event::OrderCommitted(order.id));
        info!(order_id = %order.id, buyer_id = %order.buyer_id, %total, "committed order");

        Ok(CheckoutReceipt {
            order,
            notification,
        })
    }

    /// All orders committed by `buyer_id`, in the order they were created.
    pub fn list_for(&self, buyer_id: Uuid) -> Result<Vec<Order>, ServiceError> {
        let orders: Vec<Order> = storage::read_collection(&*self.store, &self.orders_key)?;
        Ok(orders
            .into_iter()
            .filter(|order| order.buyer_id == buyer_id)
            .collect())
    }
}

/// Shipping details collected at checkout.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutInput {
    #[validate(length(min = 1, message = "shipping address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "phone number is required"))]
    pub phone: String,
}

/// Whether the receipt notification made it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    /// Delivery failed; the order committed anyway.
    Failed(String),
}

/// Result of a successful commit: the stored order plus the notification
/// outcome, kept separate so a delivery warning is never mistaken for a
/// failed commit.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub notification: NotificationStatus,
}

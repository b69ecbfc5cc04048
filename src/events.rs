//! Domain events emitted by the services.
//!
//! Events are advisory: every emission goes through [`EventSender::send_or_log`],
//! which logs and moves on if nobody is listening. An operation never fails
//! because its event could not be delivered.

use std::sync::mpsc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// The events that can occur in the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductAdded(Uuid),
    ProductPriceChanged { product_id: Uuid, new_price: Decimal },
    ProductRemoved(Uuid),

    // Rating events
    CommentAdded { product_id: Uuid },

    // Cart events
    CartItemAdded { product_id: Uuid, line_id: Uuid },
    CartItemRemoved(Uuid),
    CartCleared,

    // Order events
    OrderCommitted(Uuid),
}

/// Cloneable handle for publishing events.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end an embedder drains.
    pub fn channel() -> (Self, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }

    pub fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .map_err(|err| format!("failed to send event: {}", err))
    }

    /// Sends an event, logging instead of failing when the receiver is gone.
    pub fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event) {
            warn!(%err, "event receiver dropped, discarding event");
        }
    }
}

//! AgroMarket core engine
//!
//! The domain logic of a produce marketplace: a seller-managed product
//! catalog, a per-session shopping cart, comment-based rating aggregation,
//! and the commit step that turns a cart into an immutable order and sends
//! the buyer a receipt.
//!
//! Everything is synchronous and single-threaded; durable state lives in an
//! injected [`storage::KeyValueStore`] (one JSON array per collection), the
//! current user comes from an injected [`auth::IdentityProvider`], and the
//! receipt goes out through an injected
//! [`services::NotificationSender`]. There are no ambient globals, so tests
//! and embedders get fully isolated instances.
//!
//! ```
//! use agromarket_core::Marketplace;
//! use agromarket_core::entities::{Identity, Role, UnitOfMeasure};
//! use agromarket_core::services::{CheckoutInput, NewProduct};
//! use rust_decimal::Decimal;
//! use uuid::Uuid;
//!
//! let (market, _events) = Marketplace::in_memory();
//!
//! market.identity().set_identity(&Identity {
//!     id: Uuid::new_v4(),
//!     name: "Don Jose".into(),
//!     email: "jose@example.com".into(),
//!     phone: "70002222".into(),
//!     dui: "11111111-1".into(),
//!     address: "Santa Ana".into(),
//!     role: Role::Seller,
//! }).unwrap();
//!
//! let tomate = market.catalog().add_product(NewProduct {
//!     name: "Tomate".into(),
//!     description: "Tomate fresco".into(),
//!     price: Decimal::new(15, 1),
//!     unit: UnitOfMeasure::Pound,
//!     image_url: "tomate.jpg".into(),
//! }).unwrap();
//!
//! market.cart().add_item(&tomate, 3).unwrap();
//! assert_eq!(market.cart().total().unwrap(), Decimal::new(45, 1));
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod services;
pub mod storage;

use std::sync::mpsc;
use std::sync::Arc;

use auth::{IdentityProvider, StoredIdentityProvider};
use config::AppConfig;
use events::{Event, EventSender};
use services::{
    CartService, CatalogService, LogSender, NotificationSender, OrderService, RatingService,
};
use storage::{KeyValueStore, MemoryStore};

/// Wires the storage, identity provider, event channel, and services
/// together. One `Marketplace` per embedding context; the returned receiver
/// carries every domain event the services emit.
pub struct Marketplace {
    config: AppConfig,
    identity: Arc<dyn IdentityProvider>,
    catalog: CatalogService,
    ratings: RatingService,
    cart: Arc<CartService>,
    orders: OrderService,
}

impl Marketplace {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn NotificationSender>,
        config: AppConfig,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (events, receiver) = EventSender::channel();
        let events = Arc::new(events);

        let identity: Arc<dyn IdentityProvider> =
            Arc::new(StoredIdentityProvider::new(store.clone(), &config));
        let catalog = CatalogService::new(
            store.clone(),
            identity.clone(),
            events.clone(),
            &config,
        );
        let ratings = RatingService::new(
            store.clone(),
            identity.clone(),
            events.clone(),
            &config,
        );
        let cart = Arc::new(CartService::new(store.clone(), events.clone(), &config));
        let orders = OrderService::new(
            store,
            identity.clone(),
            cart.clone(),
            notifier,
            events,
            &config,
        );

        (
            Self {
                config,
                identity,
                catalog,
                ratings,
                cart,
                orders,
            },
            receiver,
        )
    }

    /// A marketplace over a fresh in-memory store with the log-only receipt
    /// sender and default configuration.
    pub fn in_memory() -> (Self, mpsc::Receiver<Event>) {
        let config = AppConfig::default();
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LogSender::new(&config.notifications)),
            config,
        )
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn ratings(&self) -> &RatingService {
        &self.ratings
    }

    pub fn cart(&self) -> &CartService {
        &self.cart
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }
}

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::auth::IdentityProvider;
use crate::config::AppConfig;
use crate::entities::{Identity, Product, Role, UnitOfMeasure};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::storage::{self, KeyValueStore};

/// Catalog service: the set of products available for sale.
///
/// Mutations are seller-gated. Edits and removals of an unknown id are
/// no-ops rather than errors so a stale view can retry them harmlessly.
/// Lookup preserves catalog insertion order.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityProvider>,
    events: Arc<EventSender>,
    products_key: String,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityProvider>,
        events: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            identity,
            events,
            products_key: config.storage.products.clone(),
        }
    }

    /// Adds a product to the catalog and returns the stored record.
    ///
    /// Requires a seller identity. Name, description, and image must be
    /// non-empty and the price positive. Names are not unique; two sellers
    /// can both list "Tomate".
    #[instrument(skip(self, input))]
    pub fn add_product(&self, input: NewProduct) -> Result<Product, ServiceError> {
        let seller = self.require_seller()?;
        input.validate()?;
        if input.price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "price must be greater than zero".to_string(),
            ));
        }

        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            unit: input.unit,
            image_url: input.image_url,
            owner_id: seller.id,
        };

        let mut catalog: Vec<Product> = storage::read_collection(&*self.store, &self.products_key)?;
        catalog.push(product.clone());
        storage::write_collection(&*self.store, &self.products_key, &catalog)?;

        self.events.send_or_log(Event::ProductAdded(product.id));
        info!(product_id = %product.id, name = %product.name, "added product to catalog");
        Ok(product)
    }

    /// Replaces the price of the product with `id`, preserving every other
    /// field. Unknown id is a no-op.
    #[instrument(skip(self))]
    pub fn edit_price(&self, id: Uuid, new_price: Decimal) -> Result<(), ServiceError> {
        self.require_seller()?;

        let mut catalog: Vec<Product> = storage::read_collection(&*self.store, &self.products_key)?;
        let Some(product) = catalog.iter_mut().find(|p| p.id == id) else {
            return Ok(());
        };

        product.price = new_price;
        storage::write_collection(&*self.store, &self.products_key, &catalog)?;

        self.events.send_or_log(Event::ProductPriceChanged {
            product_id: id,
            new_price,
        });
        info!(product_id = %id, %new_price, "edited product price");
        Ok(())
    }

    /// Removes the product with `id`. Unknown id is a no-op.
    #[instrument(skip(self))]
    pub fn remove_product(&self, id: Uuid) -> Result<(), ServiceError> {
        self.require_seller()?;

        let mut catalog: Vec<Product> = storage::read_collection(&*self.store, &self.products_key)?;
        let before = catalog.len();
        catalog.retain(|p| p.id != id);
        if catalog.len() == before {
            return Ok(());
        }

        storage::write_collection(&*self.store, &self.products_key, &catalog)?;
        self.events.send_or_log(Event::ProductRemoved(id));
        info!(product_id = %id, "removed product from catalog");
        Ok(())
    }

    /// Returns the products matching the given filters, in insertion order.
    ///
    /// `name_contains` is a case-insensitive substring match; `unit` is an
    /// equality match. With both filters omitted this is the full catalog.
    /// Read-only, so no role gate.
    pub fn filter(&self, params: &FilterParams) -> Result<Vec<Product>, ServiceError> {
        let catalog: Vec<Product> = storage::read_collection(&*self.store, &self.products_key)?;
        let needle = params.name_contains.as_deref().map(str::to_lowercase);

        Ok(catalog
            .into_iter()
            .filter(|product| {
                needle
                    .as_deref()
                    .map_or(true, |n| product.name.to_lowercase().contains(n))
                    && params.unit.map_or(true, |u| product.unit == u)
            })
            .collect())
    }

    fn require_seller(&self) -> Result<Identity, ServiceError> {
        let identity = self.identity.current_identity()?.ok_or_else(|| {
            ServiceError::ValidationError("no identity set".to_string())
        })?;

        if identity.role != Role::Seller {
            return Err(ServiceError::Forbidden(
                "catalog changes require the seller role".to_string(),
            ));
        }
        Ok(identity)
    }
}

/// Input for adding a product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub price: Decimal,
    pub unit: UnitOfMeasure,
    #[validate(length(min = 1, message = "an image reference is required"))]
    pub image_url: String,
}

/// Catalog lookup filters; both default to "no filter".
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub name_contains: Option<String>,
    pub unit: Option<UnitOfMeasure>,
}

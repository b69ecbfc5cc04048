use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::{CartItem, Product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::storage::{self, KeyValueStore};

/// Cart service: the session's in-progress selection of products.
///
/// Every mutation persists the cart, and every read re-reads it from storage,
/// so the cart survives an embedder restart and picks up writes made by
/// another embedder sharing the store (last writer wins between them).
///
/// Repeated adds of the same product append separate lines; quantities are
/// never merged. Each line carries its own id for removal.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn KeyValueStore>,
    events: Arc<EventSender>,
    cart_key: String,
}

impl CartService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        events: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            events,
            cart_key: config.storage.cart.clone(),
        }
    }

    /// Appends a line for `quantity` units of `product`, snapshotting its
    /// name, price, and image. Quantity must be at least 1.
    #[instrument(skip(self, product))]
    pub fn add_item(&self, product: &Product, quantity: u32) -> Result<CartItem, ServiceError> {
        if quantity == 0 {
            return Err(ServiceError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }

        let item = CartItem {
            id: Uuid::new_v4(),
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity,
        };

        let mut items = self.items()?;
        items.push(item.clone());
        storage::write_collection(&*self.store, &self.cart_key, &items)?;

        self.events.send_or_log(Event::CartItemAdded {
            product_id: product.id,
            line_id: item.id,
        });
        info!(product_id = %product.id, quantity, "added item to cart");
        Ok(item)
    }

    /// Removes the first line whose id matches. Unknown id is a no-op.
    #[instrument(skip(self))]
    pub fn remove_item(&self, line_id: Uuid) -> Result<(), ServiceError> {
        let mut items = self.items()?;
        let Some(pos) = items.iter().position(|item| item.id == line_id) else {
            return Ok(());
        };

        items.remove(pos);
        storage::write_collection(&*self.store, &self.cart_key, &items)?;
        self.events.send_or_log(Event::CartItemRemoved(line_id));
        info!(%line_id, "removed item from cart");
        Ok(())
    }

    /// The current cart lines, freshly read from storage.
    pub fn items(&self) -> Result<Vec<CartItem>, ServiceError> {
        storage::read_collection(&*self.store, &self.cart_key)
    }

    /// Sum of `quantity * price` over all lines.
    ///
    /// Malformed stored prices and quantities were already coerced to zero at
    /// the read boundary, so corrupt lines contribute nothing instead of
    /// failing the fold. Overflow saturates at `Decimal::MAX`.
    pub fn total(&self) -> Result<Decimal, ServiceError> {
        Ok(self
            .items()?
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, |acc, line| {
                acc.checked_add(line).unwrap_or(Decimal::MAX)
            }))
    }

    /// Empties the cart. Invoked by the order service after a commit.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), ServiceError> {
        storage::write_collection::<CartItem>(&*self.store, &self.cart_key, &[])?;
        self.events.send_or_log(Event::CartCleared);
        info!("cleared cart");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UnitOfMeasure;
    use crate::storage::MemoryStore;
    use rust_decimal_macros::dec;

    fn service() -> (CartService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let (events, _receiver) = EventSender::channel();
        let service = CartService::new(store.clone(), Arc::new(events), &AppConfig::default());
        (service, store)
    }

    fn product(name: &str, price: Decimal) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{} fresco", name),
            price,
            unit: UnitOfMeasure::Pound,
            image_url: format!("{}.jpg", name.to_lowercase()),
            owner_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn adding_snapshots_the_product_fields() {
        let (service, _) = service();
        let tomate = product("Tomate", dec!(1.5));
        let line = service.add_item(&tomate, 3).unwrap();

        assert_eq!(line.product_id, tomate.id);
        assert_eq!(line.name, "Tomate");
        assert_eq!(line.price, dec!(1.5));
        assert_eq!(line.quantity, 3);
        assert_eq!(service.items().unwrap(), vec![line]);
    }

    #[test]
    fn repeated_adds_append_lines_instead_of_merging() {
        let (service, _) = service();
        let tomate = product("Tomate", dec!(1.5));
        let first = service.add_item(&tomate, 1).unwrap();
        let second = service.add_item(&tomate, 2).unwrap();

        let items = service.items().unwrap();
        assert_eq!(items.len(), 2);
        assert_ne!(first.id, second.id);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].quantity, 2);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let (service, _) = service();
        let err = service.add_item(&product("Papa", dec!(0.8)), 0).unwrap_err();
        assert!(err.is_validation());
        assert!(service.items().unwrap().is_empty());
    }

    #[test]
    fn total_sums_quantity_times_price() {
        let (service, _) = service();
        service.add_item(&product("A", dec!(2)), 3).unwrap();
        service.add_item(&product("B", dec!(5)), 1).unwrap();
        assert_eq!(service.total().unwrap(), dec!(11));
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let (service, _) = service();
        let gold = product("Oro", Decimal::MAX);
        service.add_item(&gold, 1).unwrap();
        service.add_item(&gold, 1).unwrap();
        assert_eq!(service.total().unwrap(), Decimal::MAX);
    }

    #[test]
    fn removing_an_unknown_line_leaves_the_cart_unchanged() {
        let (service, _) = service();
        service.add_item(&product("A", dec!(2)), 1).unwrap();
        let before = service.items().unwrap();

        service.remove_item(Uuid::new_v4()).unwrap();
        assert_eq!(service.items().unwrap(), before);
    }

    #[test]
    fn removing_a_line_only_touches_that_line() {
        let (service, _) = service();
        let tomate = product("Tomate", dec!(1.5));
        let first = service.add_item(&tomate, 1).unwrap();
        let second = service.add_item(&tomate, 2).unwrap();

        service.remove_item(first.id).unwrap();

        let items = service.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, second.id);
    }

    #[test]
    fn clear_empties_the_stored_cart() {
        let (service, store) = service();
        service.add_item(&product("A", dec!(2)), 1).unwrap();
        service.clear().unwrap();

        assert!(service.items().unwrap().is_empty());
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn cart_survives_a_service_restart_on_the_same_store() {
        let (service, store) = service();
        let line = service.add_item(&product("A", dec!(2)), 2).unwrap();

        let (events, _receiver) = EventSender::channel();
        let reloaded = CartService::new(store, Arc::new(events), &AppConfig::default());
        assert_eq!(reloaded.items().unwrap(), vec![line]);
    }

    #[test]
    fn malformed_stored_lines_contribute_zero_to_the_total() {
        let (service, store) = service();
        store
            .put(
                "cart",
                r#"[{"id":"00000000-0000-0000-0000-000000000001","name":"A","price":"??","quantity":3},
                    {"id":"00000000-0000-0000-0000-000000000002","name":"B","price":5,"quantity":1}]"#,
            )
            .unwrap();

        assert_eq!(service.total().unwrap(), dec!(5));
    }

    #[test]
    fn malformed_cart_payload_reads_as_empty() {
        let (service, store) = service();
        store.put("cart", "not even json").unwrap();
        assert!(service.items().unwrap().is_empty());
        assert_eq!(service.total().unwrap(), Decimal::ZERO);
    }
}

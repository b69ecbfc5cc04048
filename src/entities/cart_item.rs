use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of the shopping cart.
///
/// Carries a denormalized snapshot of the product's name, price, and image at
/// the time it was added; a later catalog price edit does not reprice lines
/// already in the cart. The cart is a multiset: adding the same product twice
/// appends a second line rather than merging, and each line has its own `id`
/// so removal is unambiguous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub product_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "super::de::lenient_decimal")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, deserialize_with = "super::de::lenient_quantity")]
    pub quantity: u32,
}

impl CartItem {
    /// `price * quantity`, saturating at `Decimal::MAX` instead of panicking
    /// on overflow.
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of a committed order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "super::de::lenient_quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "super::de::lenient_decimal")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "super::de::lenient_decimal")]
    pub line_total: Decimal,
}

/// An immutable record of a committed cart.
///
/// `total` is computed once at commit time from the cart snapshot and stored;
/// it is never recomputed from the lines afterward. Orders are append-only
/// and scoped to the buyer who created them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub buyer_id: Uuid,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "super::de::lenient_decimal")]
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

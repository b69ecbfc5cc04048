use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// A product in the catalog.
///
/// Created by a seller; price and removal are seller-only mutations. The
/// `owner_id` is the creator's identity id, so two sellers with the same
/// display name never collide.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "super::de::lenient_decimal")]
    pub price: Decimal,
    #[serde(default)]
    pub unit: UnitOfMeasure,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub owner_id: Uuid,
}

/// Unit a product is sold by.
///
/// Pound and quintal are the small and large per-weight units of the produce
/// market; eggs and the like go by the dozen.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UnitOfMeasure {
    #[default]
    Pound,
    Quintal,
    Dozen,
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// The current user's profile.
///
/// The role is fixed at creation and gates which operations are permitted:
/// sellers mutate the catalog, buyers add to the cart, comment, and check
/// out. This crate never authenticates anyone; it only reads whatever
/// identity the provider has set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// National identity document number.
    #[serde(default)]
    pub dui: String,
    #[serde(default)]
    pub address: String,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Seller,
    Buyer,
}

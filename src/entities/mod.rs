//! Stored record types for the five persistent collections.

pub mod cart_item;
pub mod comment;
pub(crate) mod de;
pub mod identity;
pub mod order;
pub mod product;

pub use cart_item::CartItem;
pub use comment::Comment;
pub use identity::{Identity, Role};
pub use order::{Order, OrderLine};
pub use product::{Product, UnitOfMeasure};

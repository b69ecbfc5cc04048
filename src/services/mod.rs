//! Service layer: one service per concern, each holding its explicit
//! collaborators (store, identity provider, event sender) rather than reading
//! ambient state.

pub mod cart;
pub mod catalog;
pub mod notifications;
pub mod orders;
pub mod ratings;

pub use cart::CartService;
pub use catalog::{CatalogService, FilterParams, NewProduct};
pub use notifications::{LogSender, NotificationError, NotificationSender, OrderReceipt};
pub use orders::{CheckoutInput, CheckoutReceipt, NotificationStatus, OrderService};
pub use ratings::{NewComment, RatingService};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A buyer's comment on a product. Append-only; never edited after creation.
///
/// `rating` is 1-5 at creation time. Stored data may carry anything, so the
/// field reads leniently: a non-numeric or out-of-range value comes back as 0,
/// which the rating aggregation treats as zero contribution while still
/// counting the comment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub product_id: Uuid,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, deserialize_with = "super::de::lenient_rating")]
    pub rating: u8,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

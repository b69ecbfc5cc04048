use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::auth::IdentityProvider;
use crate::config::AppConfig;
use crate::entities::{Comment, Identity, Role};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::storage::{self, KeyValueStore};

/// Rating service: the append-only comment collection and the per-product
/// average derived from it.
#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityProvider>,
    events: Arc<EventSender>,
    comments_key: String,
}

impl RatingService {
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
            comments_key: config.storage.comments.clone(),
        }
    }

    /// Arithmetic mean of the ratings on a product's comments; 0.0 when the
    /// product has none.
    ///
    /// A stored comment whose rating is not a valid 1-5 integer contributes
    /// zero to the sum but still counts toward the divisor. That silently
    /// drags the average down, but it is the behavior the storefront has
    /// always had, so it stays until product says otherwise.
    pub fn average_rating(&self, product_id: Uuid) -> Result<f64, ServiceError> {
        let comments: Vec<Comment> = storage::read_collection(&*self.store, &self.comments_key)?;
        let ratings: Vec<u8> = comments
            .iter()
            .filter(|c| c.product_id == product_id)
            .map(|c| c.rating)
            .collect();

        if ratings.is_empty() {
            return Ok(0.0);
        }

        let sum: u32 = ratings
            .iter()
            .map(|&r| if (1..=5).contains(&r) { u32::from(r) } else { 0 })
            .sum();
        Ok(f64::from(sum) / ratings.len() as f64)
    }

    /// Appends a comment under the current identity's name.
    ///
    /// Buyers comment; sellers manage products. Rating must be 1-5 and the
    /// body non-empty.
    #[instrument(skip(self, input))]
    pub fn add_comment(&self, input: NewComment) -> Result<Comment, ServiceError> {
        let buyer = self.require_buyer()?;
        input.validate()?;

        let comment = Comment {
            product_id: input.product_id,
            author: buyer.name,
            body: input.body,
            rating: input.rating,
            created_at: Utc::now(),
        };

        let mut comments: Vec<Comment> =
            storage::read_collection(&*self.store, &self.comments_key)?;
        comments.push(comment.clone());
        storage::write_collection(&*self.store, &self.comments_key, &comments)?;

        self.events.send_or_log(Event::CommentAdded {
            product_id: comment.product_id,
        });
        info!(product_id = %comment.product_id, rating = comment.rating, "added comment");
        Ok(comment)
    }

    /// All comments on a product, in insertion order.
    pub fn comments_for(&self, product_id: Uuid) -> Result<Vec<Comment>, ServiceError> {
        let comments: Vec<Comment> = storage::read_collection(&*self.store, &self.comments_key)?;
        Ok(comments
            .into_iter()
            .filter(|c| c.product_id == product_id)
            .collect())
    }

    fn require_buyer(&self) -> Result<Identity, ServiceError> {
        let identity = self.identity.current_identity()?.ok_or_else(|| {
            ServiceError::ValidationError("no identity set".to_string())
        })?;

        if identity.role != Role::Buyer {
            return Err(ServiceError::Forbidden(
                "commenting requires the buyer role".to_string(),
            ));
        }
        Ok(identity)
    }
}

/// Input for adding a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "comment body is required"))]
    pub body: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StoredIdentityProvider;
    use crate::storage::MemoryStore;

    fn buyer() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Maria Lopez".to_string(),
            email: "maria@example.com".to_string(),
            phone: "70001111".to_string(),
            dui: "01234567-8".to_string(),
            address: "San Salvador".to_string(),
            role: Role::Buyer,
        }
    }

    fn service_with(identity: &Identity) -> (RatingService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::default();
        let provider = Arc::new(StoredIdentityProvider::new(store.clone(), &config));
        provider.set_identity(identity).unwrap();
        let (events, _receiver) = EventSender::channel();
        let service = RatingService::new(store.clone(), provider, Arc::new(events), &config);
        (service, store)
    }

    fn comment(product_id: Uuid, rating: u8) -> NewComment {
        NewComment {
            product_id,
            body: "Muy fresco".to_string(),
            rating,
        }
    }

    #[test]
    fn average_is_zero_without_comments() {
        let (service, _) = service_with(&buyer());
        assert_eq!(service.average_rating(Uuid::new_v4()).unwrap(), 0.0);
    }

    #[test]
    fn average_is_the_mean_of_valid_ratings() {
        let (service, _) = service_with(&buyer());
        let product_id = Uuid::new_v4();
        for rating in [4, 5, 3] {
            service.add_comment(comment(product_id, rating)).unwrap();
        }
        assert_eq!(service.average_rating(product_id).unwrap(), 4.0);
    }

    #[test]
    fn comments_on_other_products_do_not_count() {
        let (service, _) = service_with(&buyer());
        let product_id = Uuid::new_v4();
        service.add_comment(comment(product_id, 5)).unwrap();
        service.add_comment(comment(Uuid::new_v4(), 1)).unwrap();
        assert_eq!(service.average_rating(product_id).unwrap(), 5.0);
    }

    #[test]
    fn invalid_stored_rating_counts_in_the_divisor_only() {
        let (service, store) = service_with(&buyer());
        let product_id = Uuid::new_v4();
        service.add_comment(comment(product_id, 4)).unwrap();

        // Corrupt a second stored comment the way loosely typed writers do.
        let raw = format!(
            r#"[{{"product_id":"{id}","author":"Maria Lopez","body":"ok","rating":4,"created_at":"2024-01-01T00:00:00Z"}},
                {{"product_id":"{id}","author":"Anon","body":"??","rating":"excelente","created_at":"2024-01-02T00:00:00Z"}}]"#,
            id = product_id
        );
        store.put("comments", &raw).unwrap();

        // 4 and 0 across two comments.
        assert_eq!(service.average_rating(product_id).unwrap(), 2.0);
    }

    #[test]
    fn add_comment_requires_an_identity() {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::default();
        let provider = Arc::new(StoredIdentityProvider::new(store.clone(), &config));
        let (events, _receiver) = EventSender::channel();
        let service = RatingService::new(store, provider, Arc::new(events), &config);

        let err = service.add_comment(comment(Uuid::new_v4(), 3)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn seller_cannot_comment() {
        let mut seller = buyer();
        seller.role = Role::Seller;
        let (service, _) = service_with(&seller);
        let err = service.add_comment(comment(Uuid::new_v4(), 3)).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn out_of_range_rating_is_rejected_at_creation() {
        let (service, _) = service_with(&buyer());
        assert!(service
            .add_comment(comment(Uuid::new_v4(), 0))
            .unwrap_err()
            .is_validation());
        assert!(service
            .add_comment(comment(Uuid::new_v4(), 6))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn comments_for_returns_insertion_order() {
        let (service, _) = service_with(&buyer());
        let product_id = Uuid::new_v4();
        for (i, rating) in [5, 3].into_iter().enumerate() {
            let mut input = comment(product_id, rating);
            input.body = format!("comment {}", i);
            service.add_comment(input).unwrap();
        }

        let comments = service.comments_for(product_id).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "comment 0");
        assert_eq!(comments[1].body, "comment 1");
        assert_eq!(comments[0].author, "Maria Lopez");
    }
}

//! Session identity boundary.
//!
//! The services read whichever identity is currently set and gate operations
//! on its role. Authenticating that identity is somebody else's job; this
//! crate only stores and retrieves it.

use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::entities::Identity;
use crate::errors::ServiceError;
use crate::storage::KeyValueStore;

/// Supplies the current session identity.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Result<Option<Identity>, ServiceError>;
    fn set_identity(&self, identity: &Identity) -> Result<(), ServiceError>;
    fn clear_identity(&self) -> Result<(), ServiceError>;
}

/// Identity provider persisting the session under the configured storage key,
/// so the session survives an embedder restart the way the storefront's did.
pub struct StoredIdentityProvider {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl StoredIdentityProvider {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Self {
        Self {
            store,
            key: config.storage.session.clone(),
        }
    }
}

impl IdentityProvider for StoredIdentityProvider {
    fn current_identity(&self) -> Result<Option<Identity>, ServiceError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                warn!(key = %self.key, %err, "malformed stored identity, treating as signed out");
                Ok(None)
            }
        }
    }

    fn set_identity(&self, identity: &Identity) -> Result<(), ServiceError> {
        let raw = serde_json::to_string(identity)?;
        self.store.put(&self.key, &raw)?;
        Ok(())
    }

    fn clear_identity(&self) -> Result<(), ServiceError> {
        self.store.remove(&self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Role;
    use crate::storage::MemoryStore;
    use uuid::Uuid;

    fn provider() -> StoredIdentityProvider {
        StoredIdentityProvider::new(Arc::new(MemoryStore::new()), &AppConfig::default())
    }

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

    #[test]
    fn starts_signed_out() {
        assert_eq!(provider().current_identity().unwrap(), None);
    }

    #[test]
    fn set_then_current_round_trips() {
        let provider = provider();
        let identity = buyer();
        provider.set_identity(&identity).unwrap();
        assert_eq!(provider.current_identity().unwrap(), Some(identity));
    }

    #[test]
    fn clear_signs_out() {
        let provider = provider();
        provider.set_identity(&buyer()).unwrap();
        provider.clear_identity().unwrap();
        assert_eq!(provider.current_identity().unwrap(), None);
    }

    #[test]
    fn malformed_stored_identity_reads_as_signed_out() {
        let store = Arc::new(MemoryStore::new());
        store.put("user", "{broken").unwrap();
        let provider = StoredIdentityProvider::new(store, &AppConfig::default());
        assert_eq!(provider.current_identity().unwrap(), None);
    }
}

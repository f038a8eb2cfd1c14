//! Visitor identity resolution.
//!
//! Decides whether cart requests are scoped by a logged-in customer or by an
//! anonymous per-tab session, using only client-side storage. The server is
//! never consulted, so a cached customer may be stale.

use std::sync::{Arc, Mutex, PoisonError};

use kiosk_core::{CustomerRecord, Identity, SessionId};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError, keys};

/// Length of the random fragment in a generated session id.
const SESSION_FRAGMENT_LEN: usize = 9;

/// Source of the identity that scopes cart requests.
pub trait IdentityProvider: Send + Sync {
    /// The identity to scope the next request by.
    fn resolve(&self) -> Identity;
}

/// Resolves the visitor's identity from injected durable and tab-scoped stores.
pub struct IdentityResolver {
    durable: Arc<dyn KeyValueStore>,
    tab: Arc<dyn KeyValueStore>,
    // Held while reading and lazily creating the session id.
    session_lock: Mutex<()>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Create a resolver over a durable store (token, customer) and a
    /// tab-scoped store (session id).
    #[must_use]
    pub fn new(durable: Arc<dyn KeyValueStore>, tab: Arc<dyn KeyValueStore>) -> Self {
        Self {
            durable,
            tab,
            session_lock: Mutex::new(()),
        }
    }

    /// The logged-in customer, if a token and a readable customer record are
    /// both stored.
    #[must_use]
    pub fn current_customer(&self) -> Option<CustomerRecord> {
        self.stored_token()?;
        let raw = self.durable.get(keys::CUSTOMER)?;
        match serde_json::from_str(&raw) {
            Ok(customer) => Some(customer),
            Err(e) => {
                warn!(error = %e, "Cached customer record is unreadable; ignoring it");
                None
            }
        }
    }

    /// The stored bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.stored_token().map(SecretString::from)
    }

    /// A blank token counts as no token.
    fn stored_token(&self) -> Option<String> {
        self.durable
            .get(keys::TOKEN)
            .filter(|token| !token.trim().is_empty())
    }

    /// This tab's anonymous session id, created on first use.
    ///
    /// If the new id cannot be persisted the failure is logged and the id is
    /// still returned; the next call will generate another one.
    pub fn session_id(&self) -> SessionId {
        let _guard = self
            .session_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = self.tab.get(keys::SESSION_ID).and_then(SessionId::new) {
            return existing;
        }

        let fresh = generate_session_id();
        match self.tab.set(keys::SESSION_ID, fresh.as_str()) {
            Ok(()) => debug!(session_id = %fresh, "Created anonymous session"),
            Err(e) => warn!(error = %e, "Failed to persist anonymous session id"),
        }
        fresh
    }

    /// Store credentials after a successful login.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if either value could not be persisted.
    pub fn login(&self, token: &SecretString, customer: &CustomerRecord) -> Result<(), StorageError> {
        self.durable.set(keys::TOKEN, token.expose_secret())?;
        self.update_customer(customer)
    }

    /// Replace the cached customer record, e.g. after a profile edit.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the record could not be persisted.
    pub fn update_customer(&self, customer: &CustomerRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(customer).map_err(|source| StorageError::Encode {
            key: keys::CUSTOMER,
            source,
        })?;
        self.durable.set(keys::CUSTOMER, &json)
    }

    /// Forget the customer. The tab's session id is kept, so the visitor
    /// returns to the anonymous cart they had before logging in.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if either value could not be removed.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.durable.remove(keys::TOKEN)?;
        self.durable.remove(keys::CUSTOMER)
    }
}

impl IdentityProvider for IdentityResolver {
    fn resolve(&self) -> Identity {
        match self.current_customer() {
            Some(customer) => Identity::Customer(customer.id),
            None => Identity::AnonymousSession(self.session_id()),
        }
    }
}

/// A random lowercase base-36 string. Not suitable for secrets.
pub(crate) fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect()
}

fn generate_session_id() -> SessionId {
    SessionId::from_parts(
        &random_base36(SESSION_FRAGMENT_LEN),
        chrono::Utc::now().timestamp_millis(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kiosk_core::CustomerId;

    use super::*;
    use crate::storage::MemoryStore;

    const CUSTOMER_42: &str = r#"{"id": 42, "email": "jane@example.com"}"#;

    fn resolver(durable: MemoryStore, tab: MemoryStore) -> IdentityResolver {
        IdentityResolver::new(Arc::new(durable), Arc::new(tab))
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: key.into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_random_base36_shape() {
        let fragment = random_base36(9);
        assert_eq!(fragment.len(), 9);
        assert!(
            fragment
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generated_session_id_format() {
        let id = generate_session_id();
        let rest = id.as_str().strip_prefix("session_").unwrap();
        let (fragment, millis) = rest.split_at(SESSION_FRAGMENT_LEN);
        assert!(fragment.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(millis.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_anonymous_when_nothing_stored() {
        let tab = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(Arc::new(MemoryStore::new()), tab.clone());

        let identity = resolver.resolve();
        let session = identity.session_id().unwrap();
        assert!(session.as_str().starts_with("session_"));
        assert_eq!(tab.get(keys::SESSION_ID).as_deref(), Some(session.as_str()));
    }

    #[test]
    fn test_session_id_is_stable_within_a_tab() {
        let resolver = resolver(MemoryStore::new(), MemoryStore::new());
        let first = resolver.resolve();
        let second = resolver.resolve();
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_session_id_is_reused() {
        let resolver = resolver(
            MemoryStore::new(),
            MemoryStore::with_entries([(keys::SESSION_ID, "session_abc123")]),
        );
        assert_eq!(
            resolver.resolve(),
            Identity::AnonymousSession(SessionId::new("session_abc123").unwrap())
        );
    }

    #[test]
    fn test_customer_takes_precedence_over_session() {
        let resolver = resolver(
            MemoryStore::with_entries([(keys::TOKEN, "tok"), (keys::CUSTOMER, CUSTOMER_42)]),
            MemoryStore::with_entries([(keys::SESSION_ID, "session_abc123")]),
        );
        assert_eq!(resolver.resolve(), Identity::Customer(CustomerId::new(42)));
    }

    #[test]
    fn test_token_without_customer_is_anonymous() {
        let resolver = resolver(
            MemoryStore::with_entries([(keys::TOKEN, "tok")]),
            MemoryStore::new(),
        );
        assert!(resolver.resolve().session_id().is_some());
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        let resolver = resolver(
            MemoryStore::with_entries([(keys::TOKEN, " "), (keys::CUSTOMER, CUSTOMER_42)]),
            MemoryStore::new(),
        );
        assert!(resolver.current_customer().is_none());
        assert!(resolver.token().is_none());
        assert!(resolver.resolve().session_id().is_some());
    }

    #[test]
    fn test_customer_without_token_is_anonymous() {
        let resolver = resolver(
            MemoryStore::with_entries([(keys::CUSTOMER, CUSTOMER_42)]),
            MemoryStore::new(),
        );
        assert!(resolver.resolve().session_id().is_some());
    }

    #[test]
    fn test_unreadable_customer_is_anonymous() {
        let resolver = resolver(
            MemoryStore::with_entries([(keys::TOKEN, "tok"), (keys::CUSTOMER, "{oops")]),
            MemoryStore::new(),
        );
        assert!(resolver.current_customer().is_none());
        assert!(resolver.resolve().session_id().is_some());
    }

    #[test]
    fn test_logout_keeps_session_id() {
        let resolver = resolver(MemoryStore::new(), MemoryStore::new());
        let anonymous = resolver.resolve();

        let customer: CustomerRecord = serde_json::from_str(CUSTOMER_42).unwrap();
        resolver
            .login(&SecretString::from("tok"), &customer)
            .unwrap();
        assert_eq!(resolver.resolve(), Identity::Customer(CustomerId::new(42)));

        resolver.logout().unwrap();
        assert!(resolver.token().is_none());
        assert_eq!(resolver.resolve(), anonymous);
    }

    #[test]
    fn test_unpersisted_session_id_is_still_returned() {
        let resolver = IdentityResolver::new(Arc::new(MemoryStore::new()), Arc::new(ReadOnlyStore));
        let identity = resolver.resolve();
        assert!(
            identity
                .session_id()
                .unwrap()
                .as_str()
                .starts_with("session_")
        );
    }
}

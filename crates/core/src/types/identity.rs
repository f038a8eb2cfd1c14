//! Visitor identity.
//!
//! A visitor is either a logged-in customer or an anonymous browser session.
//! The cart on the server is keyed by exactly one of the two.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::id::CustomerId;

/// Opaque identifier for an anonymous visitor's cart.
///
/// Generated client-side once per tab and never rotated within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Prefix of every generated session identifier.
    pub const PREFIX: &'static str = "session_";

    /// Wrap an existing identifier, rejecting blank input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Assemble an identifier from a random fragment and a millisecond timestamp.
    #[must_use]
    pub fn from_parts(fragment: &str, timestamp_millis: i64) -> Self {
        Self(format!("{}{fragment}{timestamp_millis}", Self::PREFIX))
    }

    /// The identifier as sent to the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity a cart request is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Authenticated customer (token and cached record both present).
    Customer(CustomerId),
    /// Anonymous visitor identified by a per-tab session id.
    AnonymousSession(SessionId),
}

impl Identity {
    /// Query parameter name for customer-scoped requests.
    pub const CUSTOMER_PARAM: &'static str = "customer_id";
    /// Query parameter name for session-scoped requests.
    pub const SESSION_PARAM: &'static str = "session_id";

    /// The customer id, if this is a customer identity.
    #[must_use]
    pub const fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Self::Customer(id) => Some(*id),
            Self::AnonymousSession(_) => None,
        }
    }

    /// The session id, if this is an anonymous identity.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Customer(_) => None,
            Self::AnonymousSession(id) => Some(id),
        }
    }

    /// The single `(name, value)` query pair that scopes a cart request.
    #[must_use]
    pub fn scope_param(&self) -> (&'static str, String) {
        match self {
            Self::Customer(id) => (Self::CUSTOMER_PARAM, id.to_string()),
            Self::AnonymousSession(id) => (Self::SESSION_PARAM, id.as_str().to_owned()),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(id) => write!(f, "customer:{id}"),
            Self::AnonymousSession(id) => write!(f, "session:{id}"),
        }
    }
}

/// Customer profile as returned by the backend and cached client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    /// Backend timestamp, kept verbatim.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Backend timestamp, kept verbatim.
    #[serde(default)]
    pub updated_at: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl CustomerRecord {
    /// Name to greet the customer with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.email)
    }
}

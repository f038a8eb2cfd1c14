//! Back-office API client.
//!
//! Holds the admin session (bearer token and account) in memory and exposes
//! the dashboard, generic CRUD over [`Resource`]s, and store settings.

use std::collections::BTreeMap;
use std::sync::Arc;

use kiosk_core::Email;
use kiosk_core::client::{ExposeSecret, RestClient, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::AdminConfig;
use crate::dashboard::DashboardStats;
use crate::error::{AdminError, Result};
use crate::resources::Resource;
use crate::types::{Admin, AdminToken};

/// Store settings as returned by `GET /settings`.
pub type Settings = BTreeMap<String, Option<String>>;

/// Acknowledgement of `PUT /settings/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettingUpdated {
    pub message: String,
    pub key: String,
    pub value: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Back-office API client.
///
/// Every call except [`login`](Self::login) needs an admin token, either
/// obtained by logging in or supplied up front via [`AdminConfig`]. Without
/// one the call fails with [`AdminError::NotAuthenticated`] before any
/// request is sent.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    rest: RestClient,
    /// In-memory token cache
    token: RwLock<Option<SecretString>>,
    admin: RwLock<Option<Admin>>,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("rest", &self.inner.rest)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a client with no admin session.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        Self::with_token(rest, None)
    }

    fn with_token(rest: RestClient, token: Option<SecretString>) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                rest,
                token: RwLock::new(token),
                admin: RwLock::new(None),
            }),
        }
    }

    /// Create a client from configuration, adopting a preset token if any.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the base URL is unusable.
    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        let rest = RestClient::new(&config.api_base_url, config.http_timeout)?;
        let token = config.admin_token.clone().filter(|_| config.has_token());
        Ok(Self::with_token(rest, token))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in as an administrator and keep the issued token.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidEmail` without contacting the backend if
    /// `email` is malformed, and `AdminError::Api` if the backend rejects the
    /// credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Admin> {
        let email = Email::parse(email)?;
        let token: AdminToken = self
            .inner
            .rest
            .post(&["auth", "admin", "login"])
            .json(&LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .fetch()
            .await?;

        *self.inner.token.write().await = Some(token.access_token);
        *self.inner.admin.write().await = Some(token.admin.clone());

        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                id: Some(token.admin.id.to_string()),
                email: Some(token.admin.email.clone()),
                username: Some(token.admin.username.clone()),
                ..Default::default()
            }));
        });
        info!(admin_id = %token.admin.id, "Admin logged in");
        Ok(token.admin)
    }

    /// Set the access token directly (for a pre-issued token).
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Drop the admin session.
    pub async fn logout(&self) {
        *self.inner.token.write().await = None;
        *self.inner.admin.write().await = None;
        sentry::configure_scope(|scope| scope.set_user(None));
        debug!("Admin session cleared");
    }

    /// Get the current token (if set).
    pub async fn token(&self) -> Option<SecretString> {
        self.inner.token.read().await.clone()
    }

    /// Whether a token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// The account that logged in, if the session came from [`login`](Self::login).
    pub async fn current_admin(&self) -> Option<Admin> {
        self.inner.admin.read().await.clone()
    }

    async fn access_token(&self) -> Result<SecretString> {
        self.inner
            .token
            .read()
            .await
            .clone()
            .ok_or(AdminError::NotAuthenticated)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Fetch store-wide totals.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let token = self.access_token().await?;
        Ok(self
            .inner
            .rest
            .get(&["dashboard", "stats"])
            .bearer(Some(&token))
            .fetch()
            .await?)
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// List every record of a resource.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn list<R: Resource>(&self) -> Result<Vec<R::Record>> {
        let token = self.access_token().await?;
        let records: Vec<R::Record> = self
            .inner
            .rest
            .get(&[R::PATH])
            .bearer(Some(&token))
            .fetch()
            .await?;
        debug!(count = records.len(), "Listed {}s", R::NAME);
        Ok(records)
    }

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` wrapping `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self, id), fields(resource = R::PATH, id = %id))]
    pub async fn get<R: Resource>(&self, id: R::Id) -> Result<R::Record> {
        let token = self.access_token().await?;
        let id = id.to_string();
        Ok(self
            .inner
            .rest
            .get(&[R::PATH, &id])
            .bearer(Some(&token))
            .fetch()
            .await?)
    }

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self, input), fields(resource = R::PATH))]
    pub async fn create<R: Resource>(&self, input: &R::Input) -> Result<R::Record> {
        let token = self.access_token().await?;
        let record = self
            .inner
            .rest
            .post(&[R::PATH])
            .bearer(Some(&token))
            .json(input)
            .fetch()
            .await?;
        info!("Created {}", R::NAME);
        Ok(record)
    }

    /// Replace a record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self, id, input), fields(resource = R::PATH, id = %id))]
    pub async fn update<R: Resource>(&self, id: R::Id, input: &R::Input) -> Result<R::Record> {
        let token = self.access_token().await?;
        let id = id.to_string();
        let record = self
            .inner
            .rest
            .put(&[R::PATH, &id])
            .bearer(Some(&token))
            .json(input)
            .fetch()
            .await?;
        info!("Updated {}", R::NAME);
        Ok(record)
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self, id), fields(resource = R::PATH, id = %id))]
    pub async fn delete<R: Resource>(&self, id: R::Id) -> Result<()> {
        let token = self.access_token().await?;
        let id = id.to_string();
        self.inner
            .rest
            .delete(&[R::PATH, &id])
            .bearer(Some(&token))
            .send()
            .await?;
        info!("Deleted {}", R::NAME);
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Fetch all store settings.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<Settings> {
        let token = self.access_token().await?;
        Ok(self
            .inner
            .rest
            .get(&["settings"])
            .bearer(Some(&token))
            .fetch()
            .await?)
    }

    /// Create or overwrite one setting.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthenticated` or `AdminError::Api`.
    #[instrument(skip(self, value))]
    pub async fn update_setting(&self, key: &str, value: &str) -> Result<SettingUpdated> {
        let token = self.access_token().await?;
        Ok(self
            .inner
            .rest
            .put(&["settings", key])
            .query("value", value)
            .bearer(Some(&token))
            .fetch()
            .await?)
    }
}

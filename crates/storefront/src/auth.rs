//! Customer account operations.
//!
//! Login stores the bearer token and customer record through the
//! [`IdentityResolver`], which switches cart requests from the anonymous
//! session to the customer. Logout is purely local.

use std::sync::Arc;

use kiosk_core::client::{ApiError, ExposeSecret, RestClient, SecretString};
use kiosk_core::{CustomerRecord, Email, EmailError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::identity::IdentityResolver;
use crate::storage::StorageError;

/// Errors from account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to store credentials: {0}")]
    Storage(#[from] StorageError),
}

/// New account details.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: SecretString,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
    name: Option<&'a str>,
    phone: Option<&'a str>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ForgotPasswordBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordBody<'a> {
    token: &'a str,
    new_password: &'a str,
}

/// Successful login response.
#[derive(Clone, Deserialize)]
#[serde(from = "TokenWire")]
pub struct Token {
    pub access_token: SecretString,
    pub token_type: String,
    pub customer: CustomerRecord,
}

#[derive(Deserialize)]
struct TokenWire {
    access_token: String,
    token_type: String,
    customer: CustomerRecord,
}

impl From<TokenWire> for Token {
    fn from(wire: TokenWire) -> Self {
        Self {
            access_token: SecretString::from(wire.access_token),
            token_type: wire.token_type,
            customer: wire.customer,
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("customer", &self.customer)
            .finish()
    }
}

/// Profile fields to change. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// `{"message": ..}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Client for the customer account endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    rest: RestClient,
    identity: Arc<IdentityResolver>,
}

impl AuthClient {
    #[must_use]
    pub fn new(rest: RestClient, identity: Arc<IdentityResolver>) -> Self {
        Self { rest, identity }
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or the API rejects the
    /// registration (e.g. email already registered).
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<CustomerRecord, AuthError> {
        let email = Email::parse(&request.email)?;
        let body = RegisterBody {
            email: email.as_str(),
            username: &request.username,
            password: request.password.expose_secret(),
            name: request.name.as_deref(),
            phone: request.phone.as_deref(),
        };

        let customer: CustomerRecord = self
            .rest
            .post(&["auth", "register"])
            .json(&body)
            .fetch()
            .await?;
        info!(customer_id = %customer.id, "Registered customer");
        Ok(customer)
    }

    /// Log in and remember the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed, the credentials are
    /// rejected, or the credentials cannot be stored.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<CustomerRecord, AuthError> {
        let email = Email::parse(email)?;
        let body = LoginBody {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let token: Token = self
            .rest
            .post(&["auth", "login"])
            .json(&body)
            .fetch()
            .await?;

        self.identity.login(&token.access_token, &token.customer)?;
        set_sentry_user(&token.customer.id, Some(&token.customer.email));
        info!(customer_id = %token.customer.id, "Customer logged in");
        Ok(token.customer)
    }

    /// Forget the stored credentials. The anonymous session survives.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be removed from storage.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.identity.logout()?;
        clear_sentry_user();
        info!("Customer logged out");
        Ok(())
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or the API request fails.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, AuthError> {
        let email = Email::parse(email)?;
        Ok(self
            .rest
            .post(&["auth", "forgot-password"])
            .json(&ForgotPasswordBody {
                email: email.as_str(),
            })
            .fetch()
            .await?)
    }

    /// Set a new password using a reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired, or the API
    /// request fails.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        reset_token: &SecretString,
        new_password: &SecretString,
    ) -> Result<MessageResponse, AuthError> {
        Ok(self
            .rest
            .post(&["auth", "reset-password"])
            .json(&ResetPasswordBody {
                token: reset_token.expose_secret(),
                new_password: new_password.expose_secret(),
            })
            .fetch()
            .await?)
    }

    /// Fetch the logged-in customer from the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no token is stored or the
    /// server rejects it.
    #[instrument(skip_all)]
    pub async fn me(&self) -> Result<CustomerRecord, AuthError> {
        let token = self.require_token()?;
        Ok(self
            .rest
            .get(&["auth", "me"])
            .bearer(Some(&token))
            .fetch()
            .await?)
    }

    /// Update the logged-in customer's profile and refresh the cached record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no token is stored or the
    /// server rejects it, or an error if the refreshed record cannot be
    /// stored.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<CustomerRecord, AuthError> {
        let token = self.require_token()?;
        let updated: Option<CustomerRecord> = self
            .rest
            .put(&["auth", "profile"])
            .bearer(Some(&token))
            .json(update)
            .fetch_optional()
            .await?;

        // Some backend versions answer with an empty body or `null`.
        let customer = match updated {
            Some(customer) => customer,
            None => self.me().await?,
        };
        self.identity.update_customer(&customer)?;
        Ok(customer)
    }

    fn require_token(&self) -> Result<SecretString, ApiError> {
        self.identity.token().ok_or_else(|| {
            warn!("Account request without a stored token");
            ApiError::Unauthorized("Not authenticated".to_string())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kiosk_core::{CustomerId, Identity};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::identity::IdentityProvider;
    use crate::storage::MemoryStore;

    fn setup(server: &MockServer) -> (AuthClient, Arc<IdentityResolver>) {
        let identity = Arc::new(IdentityResolver::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        ));
        let rest = RestClient::new(&server.uri(), None).unwrap();
        (AuthClient::new(rest, identity.clone()), identity)
    }

    fn customer_json() -> serde_json::Value {
        json!({
            "id": 42, "email": "jane@example.com", "username": "jane",
            "is_active": true, "is_verified": false
        })
    }

    #[tokio::test]
    async fn test_login_switches_identity_to_customer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "jane@example.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt", "token_type": "bearer", "customer": customer_json()
            })))
            .mount(&server)
            .await;

        let (auth, identity) = setup(&server);
        let anonymous = identity.resolve();

        let customer = auth
            .login(" jane@EXAMPLE.com ", &SecretString::from("pw"))
            .await
            .unwrap();
        assert_eq!(customer.id, CustomerId::new(42));
        assert_eq!(identity.resolve(), Identity::Customer(CustomerId::new(42)));

        auth.logout().unwrap();
        assert_eq!(identity.resolve(), anonymous);
    }

    #[tokio::test]
    async fn test_rejected_login_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Incorrect email or password"})),
            )
            .mount(&server)
            .await;

        let (auth, identity) = setup(&server);
        let err = auth
            .login("jane@example.com", &SecretString::from("bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Api(ApiError::Unauthorized(_))));
        assert!(identity.token().is_none());
    }

    #[tokio::test]
    async fn test_invalid_email_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (auth, _) = setup(&server);
        let err = auth.forgot_password("not-an-email").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let server = MockServer::start().await;
        let (auth, _) = setup(&server);
        let err = auth.me().await.unwrap_err();
        assert!(matches!(err, AuthError::Api(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_cache() {
        let server = MockServer::start().await;
        let mut updated = customer_json();
        updated["city"] = json!("Lisbon");
        Mock::given(method("PUT"))
            .and(path("/auth/profile"))
            .and(header("authorization", "Bearer jwt"))
            .and(body_json(json!({"city": "Lisbon"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, identity) = setup(&server);
        let customer: CustomerRecord = serde_json::from_value(customer_json()).unwrap();
        identity
            .login(&SecretString::from("jwt"), &customer)
            .unwrap();

        let update = ProfileUpdate {
            city: Some("Lisbon".to_string()),
            ..ProfileUpdate::default()
        };
        auth.update_profile(&update).await.unwrap();
        assert_eq!(
            identity.current_customer().unwrap().city.as_deref(),
            Some("Lisbon")
        );
    }

    #[tokio::test]
    async fn test_update_profile_with_empty_reply_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/auth/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(customer_json()))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, identity) = setup(&server);
        let customer: CustomerRecord = serde_json::from_value(customer_json()).unwrap();
        identity
            .login(&SecretString::from("jwt"), &customer)
            .unwrap();

        let refreshed = auth
            .update_profile(&ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(refreshed.username.as_deref(), Some("jane"));
    }

    #[tokio::test]
    async fn test_update_profile_with_no_content_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/auth/profile"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(customer_json()))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, identity) = setup(&server);
        let mut stale: CustomerRecord = serde_json::from_value(customer_json()).unwrap();
        stale.username = None;
        identity.login(&SecretString::from("jwt"), &stale).unwrap();

        let refreshed = auth
            .update_profile(&ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(refreshed.username.as_deref(), Some("jane"));
        let cached = identity.current_customer().unwrap();
        assert_eq!(cached.username.as_deref(), Some("jane"));
    }
}

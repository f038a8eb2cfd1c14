//! Checkout: totals, order placement, and cart clearing.
//!
//! Order creation is the one storefront operation whose failure is shown to
//! the visitor; everything else on the cart path degrades silently.

use std::sync::Arc;

use kiosk_core::client::{ApiError, RestClient};
use kiosk_core::{CartLine, Email, EmailError, Order, OrderInput, OrderStatus, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::cart::CartClient;
use crate::error::add_breadcrumb;
use crate::identity::{IdentityResolver, random_base36};

/// Orders whose subtotal is above this ship for free.
const FREE_SHIPPING_OVER_UNITS: i64 = 500;

/// Flat shipping fee below the free-shipping threshold.
const SHIPPING_FEE_UNITS: i64 = 50;

/// Message shown to the visitor when an order cannot be placed.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to place order. Please try again.";

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("order could not be created: {0}")]
    OrderFailed(#[source] ApiError),
}

impl CheckoutError {
    /// Text suitable for showing to the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::MissingField(field) => format!("Please fill in your {field}."),
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::OrderFailed(_) => ORDER_FAILED_MESSAGE.to_string(),
        }
    }
}

/// How the visitor intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::CreditCard, Self::Paypal, Self::CashOnDelivery];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Paypal => "paypal",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}

/// Shipping and contact details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Check the required fields and normalise the email.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] for a blank name and
    /// [`CheckoutError::InvalidEmail`] for a malformed email.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingField("name"));
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Money owed for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl CheckoutSummary {
    #[must_use]
    pub fn for_lines(lines: &[CartLine]) -> Self {
        Self::for_subtotal(lines.iter().map(CartLine::line_total).sum())
    }

    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        let shipping = if subtotal > Price::from_units(FREE_SHIPPING_OVER_UNITS) {
            Price::ZERO
        } else {
            Price::from_units(SHIPPING_FEE_UNITS)
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub order: Order,
    pub summary: CheckoutSummary,
    /// Where the confirmation email goes.
    pub email: Email,
}

/// Client for checkout.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    rest: RestClient,
    cart: CartClient,
    identity: Arc<IdentityResolver>,
}

impl CheckoutClient {
    #[must_use]
    pub fn new(rest: RestClient, cart: CartClient, identity: Arc<IdentityResolver>) -> Self {
        Self {
            rest,
            cart,
            identity,
        }
    }

    /// A form prefilled from the logged-in customer, or blank.
    #[must_use]
    pub fn form(&self) -> CheckoutForm {
        let Some(customer) = self.identity.current_customer() else {
            return CheckoutForm::default();
        };
        CheckoutForm {
            name: customer.name.unwrap_or_default(),
            email: customer.email,
            phone: customer.phone.unwrap_or_default(),
            address: customer.address.unwrap_or_default(),
            city: customer.city.unwrap_or_default(),
            country: customer.country.unwrap_or_default(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// Create an order for the current cart, then clear the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when there is nothing to order,
    /// a validation error for a bad form, and [`CheckoutError::OrderFailed`]
    /// when the backend does not create the order. The cart is left intact
    /// on failure.
    #[instrument(skip_all, fields(payment_method = %form.payment_method))]
    pub async fn place_order(&self, form: &CheckoutForm) -> Result<OrderConfirmation, CheckoutError> {
        let email = form.validate()?;

        let cart = self.cart.get_cart().await;
        if cart.lines().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let summary = CheckoutSummary::for_lines(cart.lines());

        let input = OrderInput {
            order_number: generate_order_number(),
            customer_name: form.name.trim().to_string(),
            customer_email: Some(email.as_str().to_string()),
            total_amount: summary.total,
            status: OrderStatus::Pending,
        };

        let order: Order = self
            .rest
            .post(&["orders"])
            .json(&input)
            .fetch()
            .await
            .map_err(|e| {
                error!(error = %e, order_number = %input.order_number, "Order creation failed");
                CheckoutError::OrderFailed(e)
            })?;

        let cleared = self.cart.clear_cart().await;
        if cleared.is_degraded() {
            warn!(order_number = %order.order_number, "Order placed but cart was not cleared");
        }

        info!(order_number = %order.order_number, total = %summary.total, "Order placed");
        add_breadcrumb(
            "checkout",
            "Order placed",
            Some(&[("order_number", order.order_number.as_str())]),
        );
        Ok(OrderConfirmation {
            order,
            summary,
            email,
        })
    }
}

/// `ORD-<unix millis>-<9 uppercase base-36 chars>`.
fn generate_order_number() -> String {
    format!(
        "ORD-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        random_base36(9).to_uppercase()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kiosk_core::{CustomerRecord, Quantity};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::MemoryStore;

    fn setup(server: &MockServer) -> (CheckoutClient, Arc<IdentityResolver>) {
        let identity = Arc::new(IdentityResolver::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        ));
        let rest = RestClient::new(&server.uri(), None).unwrap();
        let cart = CartClient::new(rest.clone(), identity.clone());
        (CheckoutClient::new(rest, cart, identity.clone()), identity)
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            ..CheckoutForm::default()
        }
    }

    async fn mount_cart(server: &MockServer, unit_price: f64, quantity: u32) {
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "items": [{
                    "id": 5, "product_id": 3, "quantity": quantity, "price": unit_price,
                    "product": {"id": 3, "name": "Toaster", "price": unit_price}
                }]
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_shipping_threshold() {
        let summary = CheckoutSummary::for_subtotal(Price::from_units(500));
        assert_eq!(summary.shipping, Price::from_units(50));
        assert_eq!(summary.total, Price::from_units(550));

        let summary = CheckoutSummary::for_subtotal(Price::from_cents(50_001));
        assert_eq!(summary.shipping, Price::ZERO);
        assert_eq!(summary.total, Price::from_cents(50_001));
    }

    #[test]
    fn test_summary_from_lines() {
        let line = CartLine {
            item_id: kiosk_core::CartItemId::new(1),
            product: kiosk_core::ProductSummary {
                id: kiosk_core::ProductId::new(1),
                name: "Fan".to_string(),
                price: Price::from_units(30),
                thumbnail: None,
                image_url: None,
            },
            quantity: Quantity::new(2).unwrap(),
        };
        assert_eq!(
            CheckoutSummary::for_lines(&[line]).total,
            Price::from_units(110)
        );
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());
        let blank_name = CheckoutForm {
            name: "  ".to_string(),
            ..form()
        };
        assert!(matches!(
            blank_name.validate(),
            Err(CheckoutError::MissingField("name"))
        ));
        let bad_email = CheckoutForm {
            email: "jane".to_string(),
            ..form()
        };
        assert!(matches!(
            bad_email.validate(),
            Err(CheckoutError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(
            "cash_on_delivery".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[tokio::test]
    async fn test_form_is_prefilled_for_customer() {
        let server = MockServer::start().await;
        let (checkout, identity) = setup(&server);
        assert_eq!(checkout.form(), CheckoutForm::default());

        let customer: CustomerRecord = serde_json::from_value(json!({
            "id": 42, "email": "jane@example.com", "name": "Jane", "city": "Porto"
        }))
        .unwrap();
        identity
            .login(&SecretString::from("tok"), &customer)
            .unwrap();

        let form = checkout.form();
        assert_eq!(form.name, "Jane");
        assert_eq!(form.city, "Porto");
        assert_eq!(form.phone, "");
    }

    #[tokio::test]
    async fn test_place_order_posts_total_and_clears_cart() {
        let server = MockServer::start().await;
        mount_cart(&server, 100.0, 2).await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(body_partial_json(json!({
                "customer_name": "Jane Doe",
                "customer_email": "jane@example.com",
                "total_amount": 250.0,
                "status": "pending"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 77, "order_number": "ORD-1-X", "customer_name": "Jane Doe",
                "customer_email": "jane@example.com", "total_amount": 250.0, "status": "pending"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/cart/clear"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Cart cleared"})))
            .expect(1)
            .mount(&server)
            .await;

        let (checkout, _) = setup(&server);
        let confirmation = checkout.place_order(&form()).await.unwrap();
        assert_eq!(confirmation.order.id, kiosk_core::OrderId::new(77));
        assert_eq!(confirmation.summary.shipping, Price::from_units(50));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 0, "items": []})))
            .mount(&server)
            .await;
        Mock::given(path("/orders"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (checkout, _) = setup(&server);
        let err = checkout.place_order(&form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_order_failure_keeps_cart() {
        let server = MockServer::start().await;
        mount_cart(&server, 600.0, 1).await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
            .mount(&server)
            .await;
        Mock::given(path("/cart/clear"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (checkout, _) = setup(&server);
        let err = checkout.place_order(&form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderFailed(_)));
        assert_eq!(err.user_message(), ORDER_FAILED_MESSAGE);
    }
}

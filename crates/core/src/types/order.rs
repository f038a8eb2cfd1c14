//! Order records.

use serde::{Deserialize, Serialize};

use crate::types::id::OrderId;
use crate::types::price::Price;
use crate::types::status::OrderStatus;

/// An order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for creating or replacing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub total_amount: Price,
    pub status: OrderStatus,
}

impl From<&Order> for OrderInput {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            total_amount: order.total_amount,
            status: order.status,
        }
    }
}

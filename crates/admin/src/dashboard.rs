//! Dashboard statistics and the figures derived from them.

use kiosk_core::{Order, Price};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Product;

/// Store-wide totals from `GET /dashboard/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: Price,
    /// Five most recent orders, newest first.
    #[serde(default)]
    pub recent_orders: Vec<Order>,
    /// Five most recently added products, newest first.
    #[serde(default)]
    pub top_products: Vec<Product>,
}

impl DashboardStats {
    /// Revenue divided by order count; zero when there are no orders.
    #[must_use]
    pub fn average_order_value(&self) -> Price {
        if self.total_orders == 0 {
            return Price::ZERO;
        }
        self.total_revenue
            .amount()
            .checked_div(Decimal::from(self.total_orders))
            .map_or(Price::ZERO, |avg| Price::new(avg.round_dp(2)))
    }

    /// Recent orders that have not been delivered or cancelled.
    pub fn open_recent_orders(&self) -> impl Iterator<Item = &Order> {
        self.recent_orders.iter().filter(|o| o.status.is_open())
    }
}

/// A headline figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// One row of the recent orders or newest products panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub title: String,
    pub subtitle: String,
    pub amount: Price,
    pub note: String,
}

/// Display-ready dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub cards: Vec<StatCard>,
    pub recent_orders: Vec<PanelRow>,
    pub top_products: Vec<PanelRow>,
}

impl DashboardSummary {
    /// Shown in place of an empty panel.
    pub const NO_ORDERS: &'static str = "No orders yet";
    pub const NO_PRODUCTS: &'static str = "No products yet";

    #[must_use]
    pub fn from_stats(stats: &DashboardStats) -> Self {
        let cards = vec![
            StatCard {
                title: "Total Users",
                value: stats.total_users.to_string(),
            },
            StatCard {
                title: "Total Products",
                value: stats.total_products.to_string(),
            },
            StatCard {
                title: "Total Orders",
                value: stats.total_orders.to_string(),
            },
            StatCard {
                title: "Total Revenue",
                value: stats.total_revenue.to_string(),
            },
            StatCard {
                title: "Average Order",
                value: stats.average_order_value().to_string(),
            },
        ];

        let recent_orders = stats
            .recent_orders
            .iter()
            .map(|order| PanelRow {
                title: order.order_number.clone(),
                subtitle: order.customer_name.clone(),
                amount: order.total_amount,
                note: order.status.to_string(),
            })
            .collect();

        let top_products = stats
            .top_products
            .iter()
            .map(|product| PanelRow {
                title: product.name.clone(),
                subtitle: product
                    .category
                    .clone()
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                amount: product.price,
                note: format!("{} in stock", product.stock),
            })
            .collect();

        Self {
            cards,
            recent_orders,
            top_products,
        }
    }
}

//! Back-office resources.
//!
//! Every managed entity is exposed by the backend under the same shape:
//! `GET/POST /{path}` and `GET/PUT/DELETE /{path}/{id}`. A [`Resource`] names
//! that path and the record and input types travelling over it, so
//! [`AdminClient`](crate::AdminClient) can offer one set of CRUD methods.

use std::fmt::Display;

use kiosk_core::{CategoryId, CustomerId, CustomerRecord, Order, OrderId, OrderInput, ProductId};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{Category, CategoryInput, CustomerInput, Product, ProductInput};

/// An entity managed through the back office.
pub trait Resource {
    /// Collection path segment, e.g. `products`.
    const PATH: &'static str;
    /// Singular human name used in logs and messages.
    const NAME: &'static str;

    type Id: Copy + Display + Send + Sync;
    type Record: DeserializeOwned + Send;
    type Input: Serialize + Sync;
}

/// Catalog products.
#[derive(Debug, Clone, Copy)]
pub struct Products;

impl Resource for Products {
    const PATH: &'static str = "products";
    const NAME: &'static str = "product";

    type Id = ProductId;
    type Record = Product;
    type Input = ProductInput;
}

/// Customer orders.
#[derive(Debug, Clone, Copy)]
pub struct Orders;

impl Resource for Orders {
    const PATH: &'static str = "orders";
    const NAME: &'static str = "order";

    type Id = OrderId;
    type Record = Order;
    type Input = OrderInput;
}

/// Product categories.
#[derive(Debug, Clone, Copy)]
pub struct Categories;

impl Resource for Categories {
    const PATH: &'static str = "categories";
    const NAME: &'static str = "category";

    type Id = CategoryId;
    type Record = Category;
    type Input = CategoryInput;
}

/// Customer accounts.
#[derive(Debug, Clone, Copy)]
pub struct Customers;

impl Resource for Customers {
    const PATH: &'static str = "customers";
    const NAME: &'static str = "customer";

    type Id = CustomerId;
    type Record = CustomerRecord;
    type Input = CustomerInput;
}

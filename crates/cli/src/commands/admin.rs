//! Back-office commands.
//!
//! # Usage
//!
//! ```bash
//! # Log in and print a token to export for later commands
//! kiosk admin login --email ops@example.com
//!
//! # Or log in per command
//! KIOSK_ADMIN_EMAIL=ops@example.com KIOSK_ADMIN_PASSWORD=... kiosk admin stats
//! ```
//!
//! # Environment Variables
//!
//! - `KIOSK_ADMIN_TOKEN` - Token printed by `kiosk admin login`
//! - `KIOSK_ADMIN_EMAIL` / `KIOSK_ADMIN_PASSWORD` - Credentials used when no
//!   token is set

use clap::{Args, Subcommand};
use kiosk_admin::client::Settings;
use kiosk_admin::types::{CategoryInput, CustomerInput, ProductInput};
use kiosk_admin::{
    AdminClient, AdminConfig, Categories, Customers, DashboardSummary, Orders, Products,
};
use kiosk_core::{CategoryId, CustomerId, OrderId, OrderInput, OrderStatus, Price, ProductId};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use super::CliError;

#[derive(Args)]
pub struct AdminArgs {
    /// Admin email, used when no token is configured
    #[arg(long, env = "KIOSK_ADMIN_EMAIL", global = true)]
    email: Option<String>,

    /// Admin password, used when no token is configured
    #[arg(long, env = "KIOSK_ADMIN_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    action: AdminAction,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in and print a token for KIOSK_ADMIN_TOKEN
    Login,
    /// Show the dashboard
    Stats,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Show or change store settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Create a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Create the product hidden from the storefront
        #[arg(long)]
        inactive: bool,
    },
    /// Set the stock level of a product
    SetStock { id: ProductId, stock: i64 },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List all orders
    List,
    /// Show one order
    Get { id: OrderId },
    /// Move an order to a new status
    SetStatus { id: OrderId, status: OrderStatus },
    /// Delete an order
    Delete { id: OrderId },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List all categories
    List,
    /// Create a category
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List all customers
    List,
    /// Show one customer
    Get { id: CustomerId },
    /// Allow a customer to log in again
    Enable { id: CustomerId },
    /// Block a customer from logging in
    Disable { id: CustomerId },
    /// Delete a customer
    Delete { id: CustomerId },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// List all settings
    List,
    /// Create or overwrite a setting
    Set { key: String, value: String },
}

/// Run a back-office command.
///
/// # Errors
///
/// Returns `CliError` if configuration is invalid, no admin session can be
/// established, or the backend rejects the request.
pub async fn run(args: AdminArgs) -> Result<(), CliError> {
    let config = AdminConfig::from_env()?;
    let client = AdminClient::from_config(&config)?;

    if matches!(args.action, AdminAction::Login) {
        return login(&client, &args).await;
    }

    if !client.is_authenticated().await
        && let (Some(email), Some(password)) = (&args.email, &args.password)
    {
        client
            .login(email, &SecretString::from(password.clone()))
            .await?;
    }

    match args.action {
        AdminAction::Login => Ok(()),
        AdminAction::Stats => stats(&client).await,
        AdminAction::Products { action } => products(&client, action).await,
        AdminAction::Orders { action } => orders(&client, action).await,
        AdminAction::Categories { action } => categories(&client, action).await,
        AdminAction::Customers { action } => customers(&client, action).await,
        AdminAction::Settings { action } => settings(&client, action).await,
    }
}

#[allow(clippy::print_stdout)]
async fn login(client: &AdminClient, args: &AdminArgs) -> Result<(), CliError> {
    let (Some(email), Some(password)) = (&args.email, &args.password) else {
        return Err(CliError::Usage(
            "admin login needs --email and --password (or KIOSK_ADMIN_EMAIL / KIOSK_ADMIN_PASSWORD)"
                .to_string(),
        ));
    };
    let admin = client
        .login(email, &SecretString::from(password.clone()))
        .await?;
    println!("Logged in as {}.", admin.display_name());
    if let Some(token) = client.token().await {
        println!("export KIOSK_ADMIN_TOKEN={}", token.expose_secret());
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn stats(client: &AdminClient) -> Result<(), CliError> {
    let summary = DashboardSummary::from_stats(&client.dashboard_stats().await?);

    for card in &summary.cards {
        println!("{:<16} {:>12}", card.title, card.value);
    }

    println!("\nRecent Orders");
    if summary.recent_orders.is_empty() {
        println!("  {}", DashboardSummary::NO_ORDERS);
    }
    for row in &summary.recent_orders {
        println!(
            "  {:<28} {:<20} {:>10}  {}",
            row.title,
            row.subtitle,
            row.amount.to_string(),
            row.note
        );
    }

    println!("\nTop Products");
    if summary.top_products.is_empty() {
        println!("  {}", DashboardSummary::NO_PRODUCTS);
    }
    for row in &summary.top_products {
        println!(
            "  {:<28} {:<20} {:>10}  {}",
            row.title,
            row.subtitle,
            row.amount.to_string(),
            row.note
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn products(client: &AdminClient, action: ProductAction) -> Result<(), CliError> {
    match action {
        ProductAction::List => {
            for product in client.list::<Products>().await? {
                println!(
                    "{:>5}  {:<36} {:>10} {:>6}  {}{}",
                    product.id.get(),
                    product.name,
                    product.price.to_string(),
                    product.stock,
                    product.category.as_deref().unwrap_or("Uncategorized"),
                    if product.is_active { "" } else { "  (inactive)" },
                );
            }
        }
        ProductAction::Create {
            name,
            price,
            stock,
            category,
            sku,
            description,
            inactive,
        } => {
            let input = ProductInput {
                description,
                stock,
                category,
                sku,
                is_active: !inactive,
                ..ProductInput::new(name, Price::new(price))
            };
            let product = client.create::<Products>(&input).await?;
            println!("Created product {} ({}).", product.id, product.name);
        }
        ProductAction::SetStock { id, stock } => {
            let current = client.get::<Products>(id).await?;
            let input = ProductInput {
                stock,
                ..ProductInput::from(&current)
            };
            let product = client.update::<Products>(id, &input).await?;
            println!("{} now has {} in stock.", product.name, product.stock);
        }
        ProductAction::Delete { id } => {
            client.delete::<Products>(id).await?;
            println!("Deleted product {id}.");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn orders(client: &AdminClient, action: OrderAction) -> Result<(), CliError> {
    match action {
        OrderAction::List => {
            for order in client.list::<Orders>().await? {
                println!(
                    "{:>5}  {:<28} {:<24} {:>10}  {}",
                    order.id.get(),
                    order.order_number,
                    order.customer_name,
                    order.total_amount.to_string(),
                    order.status,
                );
            }
        }
        OrderAction::Get { id } => {
            let order = client.get::<Orders>(id).await?;
            println!("{} ({})", order.order_number, order.status);
            println!("  Customer: {}", order.customer_name);
            if let Some(email) = &order.customer_email {
                println!("  Email:    {email}");
            }
            println!("  Total:    {}", order.total_amount);
            if let Some(created_at) = &order.created_at {
                println!("  Placed:   {created_at}");
            }
        }
        OrderAction::SetStatus { id, status } => {
            let current = client.get::<Orders>(id).await?;
            let input = OrderInput {
                status,
                ..OrderInput::from(&current)
            };
            let order = client.update::<Orders>(id, &input).await?;
            println!("{} is now {}.", order.order_number, order.status);
        }
        OrderAction::Delete { id } => {
            client.delete::<Orders>(id).await?;
            println!("Deleted order {id}.");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn categories(client: &AdminClient, action: CategoryAction) -> Result<(), CliError> {
    match action {
        CategoryAction::List => {
            for category in client.list::<Categories>().await? {
                println!(
                    "{:>5}  {:<24} {}",
                    category.id.get(),
                    category.name,
                    category.description.as_deref().unwrap_or_default()
                );
            }
        }
        CategoryAction::Create { name, description } => {
            let category = client
                .create::<Categories>(&CategoryInput { name, description })
                .await?;
            println!("Created category {} ({}).", category.id, category.name);
        }
        CategoryAction::Delete { id } => {
            client.delete::<Categories>(id).await?;
            println!("Deleted category {id}.");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn customers(client: &AdminClient, action: CustomerAction) -> Result<(), CliError> {
    match action {
        CustomerAction::List => {
            for customer in client.list::<Customers>().await? {
                println!(
                    "{:>5}  {:<24} {:<32} {}",
                    customer.id.get(),
                    customer.display_name(),
                    customer.email,
                    if customer.is_active { "active" } else { "disabled" },
                );
            }
        }
        CustomerAction::Get { id } => {
            let customer = client.get::<Customers>(id).await?;
            println!("{} <{}>", customer.display_name(), customer.email);
            for (label, value) in [
                ("Username", customer.username.as_deref()),
                ("Phone", customer.phone.as_deref()),
                ("Address", customer.address.as_deref()),
                ("City", customer.city.as_deref()),
                ("Country", customer.country.as_deref()),
            ] {
                if let Some(value) = value {
                    println!("  {label}: {value}");
                }
            }
            println!(
                "  {}, {}",
                if customer.is_active { "active" } else { "disabled" },
                if customer.is_verified { "verified" } else { "unverified" }
            );
        }
        CustomerAction::Enable { id } => set_customer_active(client, id, true).await?,
        CustomerAction::Disable { id } => set_customer_active(client, id, false).await?,
        CustomerAction::Delete { id } => {
            client.delete::<Customers>(id).await?;
            println!("Deleted customer {id}.");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn set_customer_active(
    client: &AdminClient,
    id: CustomerId,
    is_active: bool,
) -> Result<(), CliError> {
    let current = client.get::<Customers>(id).await?;
    let input = CustomerInput {
        is_active,
        ..CustomerInput::from(&current)
    };
    let customer = client.update::<Customers>(id, &input).await?;
    println!(
        "{} is now {}.",
        customer.display_name(),
        if customer.is_active { "active" } else { "disabled" }
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn settings(client: &AdminClient, action: SettingsAction) -> Result<(), CliError> {
    match action {
        SettingsAction::List => {
            let settings: Settings = client.settings().await?;
            if settings.is_empty() {
                println!("No settings stored.");
            }
            for (key, value) in &settings {
                println!("{key} = {}", value.as_deref().unwrap_or("(unset)"));
            }
        }
        SettingsAction::Set { key, value } => {
            let updated = client.update_setting(&key, &value).await?;
            println!("{}: {} = {}", updated.message, updated.key, updated.value);
        }
    }
    Ok(())
}

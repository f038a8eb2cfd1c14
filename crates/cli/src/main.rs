//! Kiosk CLI - storefront and back-office front end.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! kiosk catalog products --category Kitchen
//!
//! # Work with the cart of this tab (KIOSK_TAB) or the logged-in customer
//! kiosk cart add 7 --quantity 3
//! kiosk cart show
//!
//! # Customer account
//! kiosk account login --email jane@example.com
//!
//! # Place an order for the current cart
//! kiosk checkout --name "Jane Doe" --address "1 Main St"
//!
//! # Back office
//! kiosk admin login --email ops@example.com
//! kiosk admin orders set-status 12 shipped
//! ```
//!
//! # Commands
//!
//! - `catalog` - Browse products and categories
//! - `cart` - Show and change the cart
//! - `account` - Register, log in, manage the profile
//! - `checkout` - Place an order
//! - `admin` - Dashboard, CRUD over store data, settings

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use kiosk_storefront::{Storefront, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "kiosk")]
#[command(author, version, about = "Kiosk storefront and back-office CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products and categories
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Customer account
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Place an order for the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Back-office management
    Admin(commands::admin::AdminArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN")
        .ok()
        .filter(|v| !v.trim().is_empty())?;
    let environment = std::env::var("SENTRY_ENVIRONMENT")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: environment.map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load .env before reading SENTRY_DSN
    dotenvy::dotenv().ok();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kiosk=info,kiosk_storefront=info,kiosk_admin=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.report();
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", e.user_message());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Admin(args) => commands::admin::run(args).await,
        Commands::Catalog { action } => {
            let storefront = storefront()?;
            commands::catalog::run(&storefront, action).await
        }
        Commands::Cart { action } => {
            let storefront = storefront()?;
            commands::cart::run(&storefront, action).await
        }
        Commands::Account { action } => {
            let storefront = storefront()?;
            commands::account::run(&storefront, action).await
        }
        Commands::Checkout(args) => {
            let storefront = storefront()?;
            commands::checkout::run(&storefront, args).await
        }
    }
}

fn storefront() -> Result<Storefront, CliError> {
    let config = StorefrontConfig::from_env()?;
    Ok(Storefront::new(config)?)
}

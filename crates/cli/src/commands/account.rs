//! Customer account commands.

use clap::Subcommand;
use kiosk_core::Identity;
use kiosk_storefront::Storefront;
use kiosk_storefront::auth::{ProfileUpdate, RegisterRequest};
use kiosk_storefront::identity::IdentityProvider;
use secrecy::SecretString;

use super::CliError;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create a customer account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "KIOSK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Log in; the cart follows the customer from now on
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "KIOSK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out; the anonymous cart of this tab is kept
    Logout,
    /// Show the logged-in customer's profile
    Whoami,
    /// Show which identity the cart is scoped by
    Identity,
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "KIOSK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
}

#[allow(clippy::print_stdout)]
pub async fn run(storefront: &Storefront, action: AccountAction) -> Result<(), CliError> {
    let auth = storefront.auth();
    match action {
        AccountAction::Register {
            email,
            username,
            password,
            name,
            phone,
        } => {
            let customer = auth
                .register(&RegisterRequest {
                    email,
                    username,
                    password: SecretString::from(password),
                    name,
                    phone,
                })
                .await?;
            println!("Registered {}. You can now log in.", customer.email);
        }
        AccountAction::Login { email, password } => {
            let customer = auth.login(&email, &SecretString::from(password)).await?;
            println!("Welcome back, {}!", customer.display_name());
        }
        AccountAction::Logout => {
            auth.logout()?;
            println!("Logged out.");
        }
        AccountAction::Whoami => {
            let customer = auth.me().await?;
            println!("{} <{}>", customer.display_name(), customer.email);
            for (label, value) in [
                ("Phone", customer.phone.as_deref()),
                ("Address", customer.address.as_deref()),
                ("City", customer.city.as_deref()),
                ("Country", customer.country.as_deref()),
            ] {
                if let Some(value) = value {
                    println!("  {label}: {value}");
                }
            }
        }
        AccountAction::Identity => match storefront.identity().resolve() {
            Identity::Customer(id) => println!("Customer {id}"),
            Identity::AnonymousSession(session) => {
                println!("Anonymous session {session} (tab '{}')", storefront.config().tab);
            }
        },
        AccountAction::ForgotPassword { email } => {
            let reply = auth.forgot_password(&email).await?;
            println!("{}", reply.message);
        }
        AccountAction::ResetPassword { token, password } => {
            let reply = auth
                .reset_password(&SecretString::from(token), &SecretString::from(password))
                .await?;
            println!("{}", reply.message);
        }
        AccountAction::UpdateProfile {
            name,
            phone,
            address,
            city,
            country,
        } => {
            let update = ProfileUpdate {
                name,
                phone,
                address,
                city,
                country,
            };
            if update == ProfileUpdate::default() {
                return Err(CliError::Usage(
                    "Nothing to update; pass at least one field.".to_string(),
                ));
            }
            let customer = auth.update_profile(&update).await?;
            println!("Profile updated for {}.", customer.display_name());
        }
    }
    Ok(())
}

//! Checkout command.

use clap::Args;
use kiosk_storefront::Storefront;
use kiosk_storefront::checkout::{CheckoutSummary, PaymentMethod};

use super::{CliError, print_cart};

/// Shipping and contact details. Omitted fields fall back to the logged-in
/// customer's profile.
#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// credit_card, paypal or cash_on_delivery
    #[arg(long, default_value_t = PaymentMethod::CreditCard)]
    payment: PaymentMethod,
}

#[allow(clippy::print_stdout)]
pub async fn run(storefront: &Storefront, args: CheckoutArgs) -> Result<(), CliError> {
    let checkout = storefront.checkout();

    let mut form = checkout.form();
    let overrides = [
        (&mut form.name, args.name),
        (&mut form.email, args.email),
        (&mut form.phone, args.phone),
        (&mut form.address, args.address),
        (&mut form.city, args.city),
        (&mut form.country, args.country),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value;
        }
    }
    form.payment_method = args.payment;

    let cart = storefront.cart().get_cart().await;
    print_cart(&cart);
    if !cart.lines().is_empty() {
        print_summary(&CheckoutSummary::for_lines(cart.lines()));
    }

    let confirmation = checkout.place_order(&form).await?;
    println!(
        "\nOrder {} placed ({}). A confirmation will be sent to {}.",
        confirmation.order.order_number, confirmation.order.status, confirmation.email
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &CheckoutSummary) {
    println!("  Subtotal {:>10}", summary.subtotal.to_string());
    if summary.shipping.is_zero() {
        println!("  Shipping {:>10}", "FREE");
    } else {
        println!("  Shipping {:>10}", summary.shipping.to_string());
    }
    println!("  Total    {:>10}", summary.total.to_string());
}

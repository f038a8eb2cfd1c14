//! Cart commands.
//!
//! Cart operations never fail; a request that does not go through prints
//! whatever cart state is known along with a note.

use clap::Subcommand;
use kiosk_core::{CartItemId, ProductId, Quantity};
use kiosk_storefront::Storefront;

use super::{CliError, print_cart};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = Quantity::ONE)]
        quantity: Quantity,
    },
    /// Set the quantity of a cart line (0 removes it)
    Set {
        /// Cart line ID as shown by `kiosk cart show`
        item_id: CartItemId,
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID as shown by `kiosk cart show`
        item_id: CartItemId,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(storefront: &Storefront, action: CartAction) -> Result<(), CliError> {
    let cart = storefront.cart();
    let state = match action {
        CartAction::Show => cart.get_cart().await,
        CartAction::Add {
            product_id,
            quantity,
        } => cart.add_to_cart(product_id, quantity).await,
        CartAction::Set { item_id, quantity } => cart.set_line_quantity(item_id, quantity).await,
        CartAction::Remove { item_id } => cart.remove_line(item_id).await,
        CartAction::Clear => cart.clear_cart().await,
    };
    print_cart(&state);
    Ok(())
}

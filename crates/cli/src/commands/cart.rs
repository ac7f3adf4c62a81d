//! Shopping cart commands.

use clap::Subcommand;
use shopsphere_core::ProductId;

use super::{CommandError, Context};

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart
    Show,
    /// Add a product to the cart
    Add {
        product: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a cart line (0 removes it)
    Update { product: ProductId, quantity: u32 },
    /// Remove a product from the cart
    Remove { product: ProductId },
    /// Products often bought with what is in the cart
    Recommend,
}

pub async fn run(ctx: &Context, command: CartCommand) -> Result<(), CommandError> {
    match command {
        CartCommand::Show => {
            let items = ctx.client.load_cart().await?;
            ctx.out.cart(&items);
        }
        CartCommand::Add { product, quantity } => {
            ctx.client.add_to_cart(product, quantity).await?;
            ctx.show_notice();
            let outcome = ctx.client.sync_cart().await?;
            ctx.out.cart(&outcome.items);
        }
        CartCommand::Update { product, quantity } => {
            let line = ctx.client.update_cart_quantity(product, quantity).await?;
            ctx.show_notice();
            ctx.out.cart_line(line.as_ref());
        }
        CartCommand::Remove { product } => {
            ctx.client.remove_from_cart(product).await?;
            ctx.show_notice();
        }
        CartCommand::Recommend => {
            let products = ctx.client.cart_recommendations().await?;
            ctx.out.products(&products);
        }
    }
    Ok(())
}

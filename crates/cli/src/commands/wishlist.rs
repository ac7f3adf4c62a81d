//! Wishlist commands.

use clap::Subcommand;
use shopsphere_core::ProductId;

use super::{CommandError, Context};

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// Show the wishlist
    Show,
    /// Add a product to the wishlist
    Add { product: ProductId },
    /// Remove a product from the wishlist
    Remove { product: ProductId },
    /// Check whether a product is on the wishlist
    Check { product: ProductId },
}

pub async fn run(ctx: &Context, command: WishlistCommand) -> Result<(), CommandError> {
    match command {
        WishlistCommand::Show => {
            let items = ctx.client.load_wishlist().await?;
            ctx.out.products(&items);
        }
        WishlistCommand::Add { product } => {
            ctx.client.add_to_wishlist(product).await?;
            ctx.show_notice();
            let outcome = ctx.client.sync_wishlist().await?;
            ctx.out.products(&outcome.items);
        }
        WishlistCommand::Remove { product } => {
            ctx.client.remove_from_wishlist(product).await?;
            ctx.show_notice();
        }
        WishlistCommand::Check { product } => {
            let in_wishlist = ctx.client.check_wishlist(product).await;
            ctx.out.flag("In wishlist", in_wishlist);
        }
    }
    Ok(())
}

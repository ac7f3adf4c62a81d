//! Order history commands.

use clap::Subcommand;
use shopsphere_core::OrderId;
use tracing::{info, warn};

use super::{CommandError, Context};

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List your orders
    List {
        /// Wait for recently placed orders to appear
        #[arg(long)]
        wait: bool,
    },
    /// Show one order with its delivery timeline
    Show { id: OrderId },
    /// Synchronize in the background until done or interrupted with Ctrl-C
    Watch,
}

pub async fn run(ctx: &Context, command: OrdersCommand) -> Result<(), CommandError> {
    match command {
        OrdersCommand::List { wait } => {
            let outcome = if wait {
                ctx.client.sync_orders().await?
            } else {
                ctx.client.refresh_orders().await?
            };
            ctx.out.orders(&outcome);
        }
        OrdersCommand::Show { id } => {
            ctx.require_user()?;
            let order = ctx.client.orders().get(id).await?;
            ctx.out.order(&order);
        }
        OrdersCommand::Watch => {
            let handle = ctx.client.watch_orders()?;
            // Dropping the pending join cancels the cycle.
            tokio::select! {
                outcome = handle.join() => match outcome {
                    Some(outcome) => ctx.out.orders(&outcome),
                    None => warn!("Order sync ended without a result"),
                },
                _ = tokio::signal::ctrl_c() => info!("Order sync cancelled"),
            }
        }
    }
    Ok(())
}

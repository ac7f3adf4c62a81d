//! Catalog management for administrators.
//!
//! # Usage
//!
//! ```bash
//! shopsphere admin create --name "Cotton Kurta" --price 799 --category Clothing --stock 20
//! shopsphere admin update 42 --name "Cotton Kurta" --price 749
//! shopsphere admin delete 42
//! ```
//!
//! The backend enforces the `ADMIN` role; the check here only saves a
//! round trip.

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use shopsphere_client::api::ProductInput;
use shopsphere_core::ProductId;
use tracing::info;

use super::{CommandError, Context};

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Add a product to the catalog
    Create(ProductArgs),
    /// Replace a product's details
    Update {
        id: ProductId,

        #[command(flatten)]
        product: ProductArgs,
    },
    /// Remove a product from the catalog
    Delete { id: ProductId },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    price: Decimal,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image_url: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    stock: Option<i32>,
}

impl ProductArgs {
    fn into_input(self) -> Result<ProductInput, CommandError> {
        if self.price.is_sign_negative() {
            return Err(CommandError::Usage("Price cannot be negative".to_string()));
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(CommandError::Usage("Stock cannot be negative".to_string()));
        }
        Ok(ProductInput {
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            category: self.category,
            stock: self.stock,
        })
    }
}

pub async fn run(ctx: &Context, command: AdminCommand) -> Result<(), CommandError> {
    let user = ctx.require_user()?;
    if !user.is_admin() {
        return Err(CommandError::Usage(format!(
            "{} is not an administrator",
            user.email
        )));
    }

    let products = ctx.client.products();
    match command {
        AdminCommand::Create(args) => {
            let product = products.create(&args.into_input()?).await?;
            info!(product_id = %product.id, "Product created");
            ctx.out.product(&product);
        }
        AdminCommand::Update { id, product } => {
            let product = products.update(id, &product.into_input()?).await?;
            info!(product_id = %product.id, "Product updated");
            ctx.out.product(&product);
        }
        AdminCommand::Delete { id } => {
            products.delete(id).await?;
            info!(product_id = %id, "Product deleted");
            ctx.out.message(&format!("Product {id} deleted."));
        }
    }
    Ok(())
}

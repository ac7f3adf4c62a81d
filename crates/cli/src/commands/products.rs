//! Catalog browsing.

use clap::Subcommand;
use shopsphere_core::ProductId;

use super::{CommandError, Context};

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List the catalog, optionally one category
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product with its reviews
    Show { id: ProductId },
    /// Search the catalog
    Search { query: String },
    /// Highest rated products
    TopRated,
    /// Products similar to one product
    Similar { id: ProductId },
    /// Show recent searches
    Recent,
}

pub async fn run(ctx: &Context, command: ProductsCommand) -> Result<(), CommandError> {
    match command {
        ProductsCommand::List { category } => {
            let products = ctx.client.load_products(category.as_deref()).await?;
            ctx.out.products(&products);
        }
        ProductsCommand::Show { id } => {
            let product = match ctx.client.product(id).await {
                Ok(product) => product,
                Err(e) if e.is_not_found() => {
                    let retry = format!("shopsphere products show {id}");
                    ctx.out.not_found(&format!("Product {id}"), &retry);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            ctx.out.product(&product);
            let reviews = ctx.client.reviews().for_product(id).await?;
            ctx.out.message("");
            ctx.out.reviews(&reviews);
            if ctx.client.is_authenticated() {
                ctx.out
                    .flag("In wishlist", ctx.client.check_wishlist(id).await);
            }
        }
        ProductsCommand::Search { query } => {
            let products = ctx.client.search_products(&query).await?;
            ctx.out.products(&products);
        }
        ProductsCommand::TopRated => {
            let products = ctx.client.products().top_rated().await?;
            ctx.out.products(&products);
        }
        ProductsCommand::Similar { id } => {
            let products = ctx.client.products().recommendations(id).await?;
            ctx.out.products(&products);
        }
        ProductsCommand::Recent => {
            let searches = ctx
                .client
                .store()
                .with(|state| state.products.recent_searches.clone());
            ctx.out.recent_searches(&searches);
        }
    }
    Ok(())
}

//! ShopSphere CLI - Storefront in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password read from stdin)
//! shopsphere auth login -e asha@example.com
//!
//! # Browse and search the catalog
//! shopsphere products list --category Clothing
//! shopsphere products search "cotton kurta"
//!
//! # Fill the cart and check out
//! shopsphere cart add 42 -q 2
//! shopsphere checkout --address "12 MG Road" --city Pune --zip 411001 --phone 9876543210 --method cod
//!
//! # Wait for the new order to show up
//! shopsphere orders list --wait
//! ```
//!
//! # Commands
//!
//! - `auth` - Login, registration, logout and profile
//! - `products` - Catalog, search and recent searches
//! - `cart` - Cart contents and quantities
//! - `wishlist` - Saved products
//! - `checkout` - Simulated payment and order placement
//! - `orders` - Order history and delivery status
//! - `reviews` - Product reviews
//! - `admin` - Catalog management (administrators only)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopsphere_client::{FileStore, ShopSphere};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod config;
mod output;

use commands::{CommandError, Context};
use config::CliConfig;
use output::Output;

#[derive(Parser)]
#[command(name = "shopsphere")]
#[command(author, version, about = "ShopSphere storefront CLI")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, register and manage the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthCommand,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: commands::products::ProductsCommand,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartCommand,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::wishlist::WishlistCommand,
    },
    /// Pay for the cart and place an order
    Checkout(commands::checkout::CheckoutArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersCommand,
    },
    /// Product reviews
    Reviews {
        #[command(subcommand)]
        action: commands::reviews::ReviewsCommand,
    },
    /// Manage the catalog
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminCommand,
    },
}

/// Initialize Sentry error tracking.
///
/// Returns a guard that must be kept alive for the duration of the program.
/// Returns `None` if `SENTRY_DSN` is not configured.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
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

fn init_tracing() {
    // Logs go to stderr so stdout stays clean for command output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopsphere_client=info,shopsphere_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CliConfig) -> Result<(), CommandError> {
    let store = Arc::new(FileStore::new(&config.credentials_path));
    let client = ShopSphere::new(config.client, store)?;

    // Login and registration start a fresh session; everything else resumes
    // the stored one.
    let starts_session = matches!(
        cli.command,
        Commands::Auth {
            action: commands::auth::AuthCommand::Login { .. }
                | commands::auth::AuthCommand::Register { .. }
        }
    );
    if !starts_session {
        client.bootstrap().await?;
    }

    let ctx = Context {
        client,
        out: Output::new(cli.json),
    };

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Products { action } => commands::products::run(&ctx, action).await,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await,
        Commands::Wishlist { action } => commands::wishlist::run(&ctx, action).await,
        Commands::Checkout(args) => commands::checkout::run(&ctx, args).await,
        Commands::Orders { action } => commands::orders::run(&ctx, action).await,
        Commands::Reviews { action } => commands::reviews::run(&ctx, action).await,
        Commands::Admin { action } => commands::admin::run(&ctx, action).await,
    }
}

//! Subcommand implementations.
//!
//! Each module owns its clap subcommand enum and a `run` function that drives
//! the [`ShopSphere`] facade and renders the result through [`Output`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use std::io::{BufRead, Write};

use secrecy::SecretString;
use shopsphere_client::api::{ApiError, User};
use shopsphere_client::{ClientError, ShopSphere};
use thiserror::Error;

use crate::output::Output;

/// Errors surfaced by a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        Self::Client(err.into())
    }
}

/// Everything a command needs.
pub struct Context {
    pub client: ShopSphere,
    pub out: Output,
}

impl Context {
    /// The signed-in user, for commands that call resource APIs directly.
    fn require_user(&self) -> Result<User, CommandError> {
        self.client
            .current_user()
            .ok_or(CommandError::Client(ClientError::LoginRequired))
    }

    /// Print the notice left by the last facade call.
    fn show_notice(&self) {
        self.out.notice(self.client.state().notice.as_ref());
    }
}

/// Use `given`, or read one line from stdin.
fn secret_or_stdin(given: Option<String>, prompt: &str) -> Result<SecretString, CommandError> {
    if let Some(value) = given {
        return Ok(SecretString::from(value));
    }

    let mut stderr = std::io::stderr();
    write!(stderr, "{prompt}: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        return Err(CommandError::Usage(format!("{prompt} is required")));
    }
    Ok(SecretString::from(value))
}

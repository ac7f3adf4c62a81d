//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! shopsphere auth login -e asha@example.com        # password read from stdin
//! shopsphere auth register -e asha@example.com --first-name Asha --last-name Rao
//! shopsphere auth whoami
//! shopsphere auth profile
//! shopsphere auth logout
//! ```

use clap::Subcommand;
use shopsphere_client::Registration;

use super::{CommandError, Context, secret_or_stdin};

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Sign in and store the credential
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(short, long, env = "SHOPSPHERE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign into it
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SHOPSPHERE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the full profile of the signed-in user
    Profile,
}

pub async fn run(ctx: &Context, command: AuthCommand) -> Result<(), CommandError> {
    match command {
        AuthCommand::Login { email, password } => {
            let password = secret_or_stdin(password, "Password")?;
            let user = ctx.client.login(&email, &password).await?;
            ctx.show_notice();
            ctx.out.user(&user);
        }
        AuthCommand::Register {
            email,
            password,
            first_name,
            last_name,
            phone,
        } => {
            let password = secret_or_stdin(password, "Password")?;
            let user = ctx
                .client
                .register(&Registration {
                    email,
                    password,
                    first_name,
                    last_name,
                    phone,
                })
                .await?;
            ctx.show_notice();
            ctx.out.user(&user);
        }
        AuthCommand::Logout => {
            ctx.client.logout()?;
            ctx.show_notice();
        }
        AuthCommand::Whoami => match ctx.client.current_user() {
            Some(user) => ctx.out.user(&user),
            None => ctx.out.message("Not signed in."),
        },
        AuthCommand::Profile => {
            let profile = ctx.client.profile().await?;
            ctx.out.profile(&profile);
        }
    }
    Ok(())
}

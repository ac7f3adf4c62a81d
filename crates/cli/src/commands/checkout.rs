//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! shopsphere checkout --address "12 MG Road" --city Pune --zip 411001 \
//!     --country India --phone 9876543210 --method upi
//!
//! shopsphere checkout ... --method card --card-number "4111 1111 1111 1111" \
//!     --expiry 08/29 --holder "Asha Rao"              # CVV read from stdin
//! ```

use clap::Args;
use secrecy::ExposeSecret;
use shopsphere_client::checkout::{CardDetails, PaymentDetails, PaymentMethod, ShippingDetails};

use super::{CommandError, Context, secret_or_stdin};

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long = "zip")]
    zip_code: String,

    #[arg(long, default_value = "India")]
    country: String,

    #[arg(long)]
    phone: String,

    /// Payment method: card, paypal, cod or upi
    #[arg(long, default_value = "card")]
    method: PaymentMethod,

    #[arg(long)]
    card_number: Option<String>,

    /// Card expiry as MM/YY
    #[arg(long)]
    expiry: Option<String>,

    /// Card CVV (prompted on stdin when a card is used and this is omitted)
    #[arg(long, env = "SHOPSPHERE_CARD_CVV", hide_env_values = true)]
    cvv: Option<String>,

    /// Cardholder name
    #[arg(long)]
    holder: Option<String>,

    /// Return after placing the order instead of waiting for it to show up
    #[arg(long)]
    no_wait: bool,
}

impl CheckoutArgs {
    fn shipping(&self) -> ShippingDetails {
        ShippingDetails {
            address: self.address.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
        }
    }

    fn payment(&self) -> Result<PaymentDetails, CommandError> {
        let card = if self.method.requires_card() {
            let cvv = secret_or_stdin(self.cvv.clone(), "CVV")?;
            Some(CardDetails {
                number: self.card_number.clone().unwrap_or_default(),
                expiry: self.expiry.clone().unwrap_or_default(),
                cvv: cvv.expose_secret().to_string(),
                holder_name: self.holder.clone().unwrap_or_default(),
            })
        } else {
            None
        };
        Ok(PaymentDetails {
            method: self.method,
            card,
        })
    }
}

pub async fn run(ctx: &Context, args: CheckoutArgs) -> Result<(), CommandError> {
    let payment = args.payment()?;
    let order = ctx.client.checkout(&args.shipping(), &payment).await?;
    ctx.show_notice();
    ctx.out.order(&order);

    if !args.no_wait {
        let outcome = ctx.client.sync_orders().await?;
        ctx.out.orders(&outcome);
    }
    Ok(())
}

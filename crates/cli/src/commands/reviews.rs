//! Product review commands.

use clap::Subcommand;
use shopsphere_client::api::{MAX_RATING, MIN_RATING};
use shopsphere_core::{ProductId, ReviewId};

use super::{CommandError, Context};

#[derive(Subcommand)]
pub enum ReviewsCommand {
    /// Reviews of a product
    List { product: ProductId },
    /// Your own reviews
    Mine,
    /// Whether you may review a product
    Eligible { product: ProductId },
    /// Review a product
    Write {
        product: ProductId,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(i64::from(MIN_RATING)..=i64::from(MAX_RATING)))]
        rating: u8,

        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Change one of your reviews
    Edit {
        review: ReviewId,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(i64::from(MIN_RATING)..=i64::from(MAX_RATING)))]
        rating: u8,

        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Delete one of your reviews
    Delete { review: ReviewId },
}

pub async fn run(ctx: &Context, command: ReviewsCommand) -> Result<(), CommandError> {
    let reviews = ctx.client.reviews();
    match command {
        ReviewsCommand::List { product } => {
            ctx.out.reviews(&reviews.for_product(product).await?);
        }
        ReviewsCommand::Mine => {
            let user = ctx.require_user()?;
            ctx.out.reviews(&reviews.for_user(user.id).await?);
        }
        ReviewsCommand::Eligible { product } => {
            ctx.require_user()?;
            ctx.out
                .review_eligibility(&reviews.can_review(product).await?);
        }
        ReviewsCommand::Write {
            product,
            rating,
            comment,
        } => {
            let review = ctx.client.create_review(product, rating, &comment).await?;
            ctx.show_notice();
            ctx.out.reviews(std::slice::from_ref(&review));
        }
        ReviewsCommand::Edit {
            review,
            rating,
            comment,
        } => {
            ctx.require_user()?;
            let review = reviews.update(review, rating, &comment).await?;
            ctx.out.reviews(std::slice::from_ref(&review));
        }
        ReviewsCommand::Delete { review } => {
            ctx.require_user()?;
            reviews.delete(review).await?;
            ctx.out.message("Review deleted.");
        }
    }
    Ok(())
}

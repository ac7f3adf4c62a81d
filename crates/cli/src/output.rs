//! Terminal rendering for command results.
//!
//! The only module allowed to write to stdout. `--json` switches every
//! printer to pretty JSON of the underlying value.

#![allow(clippy::print_stdout)]

use serde::Serialize;
use shopsphere_client::api::{CartItem, Order, Product, Review, ReviewEligibility, User, UserProfile};
use shopsphere_client::{Notice, SyncOutcome};
use shopsphere_core::{OrderStatus, Price, RecentSearches, discount_percent};

#[derive(Serialize)]
struct NotFound<'a> {
    error: &'static str,
    what: &'a str,
    retry: &'a str,
}

/// Output mode selected on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit_json<T: Serialize + ?Sized>(self, value: &T) -> bool {
        if !self.json {
            return false;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to encode output"),
        }
        true
    }

    pub fn notice(self, notice: Option<&Notice>) {
        if self.json {
            return;
        }
        match notice {
            Some(Notice::Success(msg)) => println!("✓ {msg}"),
            Some(Notice::Error(msg)) => println!("✗ {msg}"),
            None => {}
        }
    }

    pub fn message(self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    /// Something the backend does not know, with the command to try again.
    pub fn not_found(self, what: &str, retry: &str) {
        let view = NotFound {
            error: "not_found",
            what,
            retry,
        };
        if self.emit_json(&view) {
            return;
        }
        println!("{}", not_found_text(what, retry));
    }

    pub fn user(self, user: &User) {
        if self.emit_json(user) {
            return;
        }
        let role = user.role.unwrap_or_default();
        println!("{} <{}> ({role}, id {})", user.display_name(), user.email, user.id);
    }

    pub fn profile(self, profile: &UserProfile) {
        if self.emit_json(profile) {
            return;
        }
        println!("{} (id {})", profile.email, profile.id);
        let name = [profile.first_name.as_deref(), profile.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            println!("  Name:    {name}");
        }
        if let Some(phone) = &profile.phone {
            println!("  Phone:   {phone}");
        }
        let address = [
            profile.address.as_deref(),
            profile.city.as_deref(),
            profile.zip_code.as_deref(),
            profile.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
        if !address.is_empty() {
            println!("  Address: {address}");
        }
    }

    pub fn products(self, products: &[Product]) {
        if self.emit_json(products) {
            return;
        }
        if products.is_empty() {
            println!("No products found.");
            return;
        }
        for product in products {
            println!(
                "{:>6}  {:<40}  {:>12}  {}",
                product.id,
                truncate(&product.name, 40),
                product.unit_price().to_string(),
                stock_label(product)
            );
        }
    }

    pub fn product(self, product: &Product) {
        if self.emit_json(product) {
            return;
        }
        let price = product.unit_price();
        let discount = discount_percent(product.id);
        println!("{} (id {})", product.name, product.id);
        match price.original(discount) {
            Ok(original) => println!("  Price:    {price}  (was {original}, {discount}% off)"),
            Err(_) => println!("  Price:    {price}"),
        }
        if let Some(category) = &product.category {
            println!("  Category: {category}");
        }
        if let Some(rating) = product.rating {
            println!(
                "  Rating:   {rating:.1} ({} reviews)",
                product.review_count.unwrap_or(0)
            );
        }
        println!("  Stock:    {}", stock_label(product));
        if let Some(description) = &product.description {
            println!();
            println!("{description}");
        }
    }

    pub fn recent_searches(self, searches: &RecentSearches) {
        if self.emit_json(searches) {
            return;
        }
        if searches.is_empty() {
            println!("No recent searches.");
        }
        for (i, query) in searches.as_slice().iter().enumerate() {
            println!("{}. {query}", i + 1);
        }
    }

    pub fn cart(self, items: &[CartItem]) {
        if self.emit_json(items) {
            return;
        }
        if items.is_empty() {
            println!("Your cart is empty.");
            return;
        }
        let mut total = Price::inr(rust_decimal::Decimal::ZERO);
        for item in items {
            let line = item.line_total();
            total.amount += line.amount;
            println!(
                "{:>6}  {:<40}  {:>3} x {:>10}  = {:>12}",
                item.product.id,
                truncate(&item.product.name, 40),
                item.quantity,
                Price::inr(item.product.price).to_string(),
                line.to_string()
            );
        }
        println!("{:>80}", format!("Total: {total}"));
    }

    pub fn cart_line(self, item: Option<&CartItem>) {
        if self.emit_json(&item) {
            return;
        }
        match item {
            Some(item) => println!(
                "{} x {} = {}",
                item.quantity,
                item.product.name,
                item.line_total()
            ),
            None => println!("Item removed from cart."),
        }
    }

    pub fn orders(self, outcome: &SyncOutcome<Order>) {
        if self.emit_json(&outcome.items) {
            return;
        }
        if outcome.items.is_empty() {
            println!("No orders yet.");
            return;
        }
        for order in &outcome.items {
            let placed = order
                .created_at
                .map(|t| t.format("%d %b %Y").to_string())
                .unwrap_or_default();
            println!(
                "#{:<6} {:<12} {:<18} {:>12}  {} item(s)",
                order.id,
                placed,
                order.status.label(),
                order.total().to_string(),
                order.order_items.len()
            );
        }
    }

    pub fn order(self, order: &Order) {
        if self.emit_json(order) {
            return;
        }
        println!("Order #{}  {}", order.id, order.total());
        if let Some(address) = &order.shipping_address {
            println!("  Ship to: {address}");
        }
        if let Some(method) = &order.payment_method {
            println!("  Payment: {method}");
        }
        println!("  Status:  {}", timeline(order.status));
        for item in &order.order_items {
            let name = item
                .product
                .as_ref()
                .map_or("(unavailable product)", |p| p.name.as_str());
            println!(
                "    {:>3} x {:<40} {:>12}",
                item.quantity,
                truncate(name, 40),
                Price::inr(item.price).to_string()
            );
        }
    }

    pub fn reviews(self, reviews: &[Review]) {
        if self.emit_json(reviews) {
            return;
        }
        if reviews.is_empty() {
            println!("No reviews yet.");
            return;
        }
        for review in reviews {
            let stars = "★".repeat(usize::from(review.rating.min(5)));
            let who = review.reviewer_name.as_deref().unwrap_or("Anonymous");
            let verified = if review.verified_purchase {
                " (verified purchase)"
            } else {
                ""
            };
            println!("{stars:<5} {who}{verified}  [review {}]", review.id);
            if let Some(comment) = &review.comment {
                println!("      {comment}");
            }
        }
    }

    pub fn review_eligibility(self, eligibility: &ReviewEligibility) {
        if self.emit_json(eligibility) {
            return;
        }
        if eligibility.can_review {
            println!("You can review this product.");
        } else {
            println!(
                "You cannot review this product: {}",
                eligibility.reason.as_deref().unwrap_or("not eligible")
            );
        }
    }

    pub fn flag(self, label: &str, value: bool) {
        if self.emit_json(&serde_json::json!({ label: value })) {
            return;
        }
        println!("{label}: {}", if value { "yes" } else { "no" });
    }
}

fn stock_label(product: &Product) -> String {
    match product.stock {
        Some(n) if n > 0 => format!("{n} in stock"),
        Some(_) => "Out of stock".to_string(),
        None => "In stock".to_string(),
    }
}

/// One-line delivery timeline with the current step in brackets.
fn timeline(status: OrderStatus) -> String {
    let Some(current) = status.step() else {
        return status.label().to_string();
    };
    OrderStatus::TIMELINE
        .iter()
        .enumerate()
        .map(|(i, step)| {
            if i == current {
                format!("[{}]", step.label())
            } else {
                step.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn not_found_text(what: &str, retry: &str) -> String {
    format!("{what} was not found.\n  Retry: {retry}")
}

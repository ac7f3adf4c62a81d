//! Application state and its single-writer store.
//!
//! All client state lives in one [`AppState`] value. It only changes through
//! [`Action`]s applied by the pure [`reduce`] function, and the [`Store`] is
//! the only place that calls it. Observers subscribe to snapshots through a
//! `tokio::sync::watch` channel.

use std::collections::HashMap;

use secrecy::SecretString;
use shopsphere_core::{Price, ProductId, RecentSearches};
use tokio::sync::watch;
use tracing::debug;

use crate::api::{CartItem, Order, Product, User};
use crate::storage::PersistedState;

// =============================================================================
// State
// =============================================================================

/// Everything the client knows, as one value.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub auth: AuthState,
    pub cart: CartState,
    pub wishlist: WishlistState,
    pub orders: OrdersState,
    pub products: ProductsState,
    /// Last transient notification.
    pub notice: Option<Notice>,
    /// Set when an operation needs the user somewhere else.
    pub redirect: Option<Route>,
}

impl AppState {
    /// Initial state from persisted storage.
    ///
    /// The session is not authenticated until it has been restored, even
    /// when a token and user backup are on disk.
    #[must_use]
    pub fn from_persisted(persisted: &PersistedState) -> Self {
        Self {
            auth: AuthState {
                user: None,
                token: persisted.token.clone(),
            },
            products: ProductsState {
                recent_searches: persisted.recent_searches.clone(),
                ..ProductsState::default()
            },
            ..Self::default()
        }
    }
}

/// Authentication state.
///
/// Authenticated exactly when both a token and a user are present.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<SecretString>,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub loading: bool,
}

impl CartState {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        let amount = self
            .items
            .iter()
            .map(|item| item.line_total().amount)
            .sum();
        Price::inr(amount)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WishlistState {
    pub items: Vec<Product>,
    /// Known membership per product, including products not in `items`.
    pub status: HashMap<ProductId, bool>,
    pub loading: bool,
}

impl WishlistState {
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.status.get(&product_id).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrdersState {
    pub items: Vec<Order>,
    pub loading: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductsState {
    /// Most recent product listing or search result.
    pub items: Vec<Product>,
    pub recent_searches: RecentSearches,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Error(msg) => msg,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Destinations an operation can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

// =============================================================================
// Actions
// =============================================================================

/// Every state transition the client performs.
#[derive(Debug, Clone)]
pub enum Action {
    /// Login, registration or a successful restore.
    SessionStarted { user: User, token: SecretString },
    /// Explicit logout. Clears auth, cart and wishlist.
    LoggedOut,
    /// Only a token is known; the session is not authenticated.
    TokenLoaded(Option<SecretString>),

    CartLoading,
    CartLoaded(Vec<CartItem>),
    /// Replace the quantity of a line with the same product, or append.
    CartItemUpserted(CartItem),
    CartItemRemoved(ProductId),
    CartCleared,

    WishlistLoading,
    WishlistLoaded(Vec<Product>),
    WishlistStatus { product_id: ProductId, in_wishlist: bool },

    OrdersLoading,
    OrdersLoaded(Vec<Order>),

    ProductsLoaded(Vec<Product>),
    RecentSearchesUpdated(RecentSearches),

    Notify(Notice),
    NoticeDismissed,
    Redirect(Route),
    RedirectHandled,
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SessionStarted { user, token } => {
            state.auth.user = Some(user);
            state.auth.token = Some(token);
            state.redirect = None;
        }
        Action::LoggedOut => {
            state.auth = AuthState::default();
            state.cart = CartState::default();
            state.wishlist = WishlistState::default();
            state.orders = OrdersState::default();
        }
        Action::TokenLoaded(token) => {
            state.auth = AuthState { user: None, token };
        }

        Action::CartLoading => state.cart.loading = true,
        Action::CartLoaded(items) => {
            state.cart.items = items;
            state.cart.loading = false;
        }
        Action::CartItemUpserted(item) => {
            if let Some(existing) = state
                .cart
                .items
                .iter_mut()
                .find(|line| line.product.id == item.product.id)
            {
                existing.quantity = item.quantity;
            } else {
                state.cart.items.push(item);
            }
        }
        Action::CartItemRemoved(product_id) => {
            state.cart.items.retain(|line| line.product.id != product_id);
        }
        Action::CartCleared => state.cart.items.clear(),

        Action::WishlistLoading => state.wishlist.loading = true,
        Action::WishlistLoaded(items) => {
            for product in &items {
                state.wishlist.status.insert(product.id, true);
            }
            state.wishlist.items = items;
            state.wishlist.loading = false;
        }
        Action::WishlistStatus {
            product_id,
            in_wishlist,
        } => {
            state.wishlist.status.insert(product_id, in_wishlist);
            if !in_wishlist {
                state.wishlist.items.retain(|p| p.id != product_id);
            }
        }

        Action::OrdersLoading => state.orders.loading = true,
        Action::OrdersLoaded(items) => {
            state.orders.items = items;
            state.orders.loading = false;
        }

        Action::ProductsLoaded(items) => state.products.items = items,
        Action::RecentSearchesUpdated(searches) => state.products.recent_searches = searches,

        Action::Notify(notice) => state.notice = Some(notice),
        Action::NoticeDismissed => state.notice = None,
        Action::Redirect(route) => state.redirect = Some(route),
        Action::RedirectHandled => state.redirect = None,
    }
}

// =============================================================================
// Store
// =============================================================================

/// Owner of the [`AppState`].
///
/// Cheap to clone; clones dispatch into the same state.
#[derive(Debug, Clone)]
pub struct Store {
    tx: watch::Sender<AppState>,
}

impl Store {
    #[must_use]
    pub fn new(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Apply `action` and notify subscribers.
    pub fn dispatch(&self, action: Action) {
        debug!(action = action_name(&action), "Dispatch");
        self.tx.send_modify(|state| reduce(state, action));
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.with(|state| state.auth.is_authenticated())
    }

    /// Receiver that sees every future state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

const fn action_name(action: &Action) -> &'static str {
    match action {
        Action::SessionStarted { .. } => "session_started",
        Action::LoggedOut => "logged_out",
        Action::TokenLoaded(_) => "token_loaded",
        Action::CartLoading => "cart_loading",
        Action::CartLoaded(_) => "cart_loaded",
        Action::CartItemUpserted(_) => "cart_item_upserted",
        Action::CartItemRemoved(_) => "cart_item_removed",
        Action::CartCleared => "cart_cleared",
        Action::WishlistLoading => "wishlist_loading",
        Action::WishlistLoaded(_) => "wishlist_loaded",
        Action::WishlistStatus { .. } => "wishlist_status",
        Action::OrdersLoading => "orders_loading",
        Action::OrdersLoaded(_) => "orders_loaded",
        Action::ProductsLoaded(_) => "products_loaded",
        Action::RecentSearchesUpdated(_) => "recent_searches_updated",
        Action::Notify(_) => "notify",
        Action::NoticeDismissed => "notice_dismissed",
        Action::Redirect(_) => "redirect",
        Action::RedirectHandled => "redirect_handled",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        serde_json::from_value(serde_json::json!({"id": id, "email": "u@shop.in"})).unwrap()
    }

    fn line(id: i64, product_id: i64, quantity: u32, price: &str) -> CartItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "product": {"id": product_id, "name": format!("P{product_id}"), "price": price},
            "quantity": quantity,
        }))
        .unwrap()
    }

    fn product(id: i64) -> Product {
        serde_json::from_value(serde_json::json!({"id": id, "name": "Mug", "price": 199})).unwrap()
    }

    #[test]
    fn test_authenticated_requires_user_and_token() {
        let mut state = AppState::default();
        assert!(!state.auth.is_authenticated());

        state.auth.token = Some(SecretString::from("t"));
        assert!(!state.auth.is_authenticated());

        state.auth.user = Some(user(7));
        assert!(state.auth.is_authenticated());

        reduce(&mut state, Action::TokenLoaded(Some(SecretString::from("t"))));
        assert!(!state.auth.is_authenticated());
        assert!(state.auth.token.is_some());

        reduce(&mut state, Action::LoggedOut);
        assert!(!state.auth.is_authenticated());
        assert!(state.auth.token.is_none());
    }

    #[test]
    fn test_from_persisted_is_not_authenticated() {
        let persisted = PersistedState {
            token: Some(SecretString::from("t")),
            user: Some(user(1)),
            recent_searches: RecentSearches::from(vec!["shoes".to_string()]),
        };
        let state = AppState::from_persisted(&persisted);
        assert!(!state.auth.is_authenticated());
        assert!(state.auth.token.is_some());
        assert_eq!(state.products.recent_searches.as_slice(), ["shoes"]);
    }

    #[test]
    fn test_cart_upsert_replaces_quantity_or_appends() {
        let mut state = AppState::default();
        reduce(&mut state, Action::CartLoaded(vec![line(1, 10, 1, "100")]));

        reduce(&mut state, Action::CartItemUpserted(line(1, 10, 3, "100")));
        assert_eq!(state.cart.items.len(), 1);
        assert_eq!(state.cart.items[0].quantity, 3);

        reduce(&mut state, Action::CartItemUpserted(line(2, 11, 2, "49.50")));
        assert_eq!(state.cart.items.len(), 2);
        assert_eq!(state.cart.total().to_string(), "₹399.00");
        assert_eq!(state.cart.item_count(), 5);

        reduce(&mut state, Action::CartItemRemoved(ProductId::new(10)));
        assert_eq!(state.cart.items.len(), 1);
        assert_eq!(state.cart.items[0].product.id, ProductId::new(11));

        reduce(&mut state, Action::CartCleared);
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_wishlist_status_tracking() {
        let mut state = AppState::default();
        reduce(&mut state, Action::WishlistLoaded(vec![product(1), product(2)]));
        assert!(state.wishlist.contains(ProductId::new(1)));
        assert!(!state.wishlist.contains(ProductId::new(3)));

        reduce(
            &mut state,
            Action::WishlistStatus {
                product_id: ProductId::new(1),
                in_wishlist: false,
            },
        );
        assert!(!state.wishlist.contains(ProductId::new(1)));
        assert_eq!(state.wishlist.items.len(), 1);

        reduce(&mut state, Action::LoggedOut);
        assert!(state.wishlist.items.is_empty());
        assert!(state.wishlist.status.is_empty());
    }

    #[test]
    fn test_notices_leave_other_state_alone() {
        let mut state = AppState::default();
        reduce(&mut state, Action::CartLoaded(vec![line(1, 10, 1, "100")]));
        reduce(&mut state, Action::Notify(Notice::Error("Out of stock".into())));

        assert_eq!(state.cart.items.len(), 1);
        assert!(state.notice.as_ref().unwrap().is_error());
        assert_eq!(state.notice.as_ref().unwrap().message(), "Out of stock");

        reduce(&mut state, Action::NoticeDismissed);
        assert!(state.notice.is_none());
    }

    #[tokio::test]
    async fn test_store_notifies_subscribers() {
        let store = Store::default();
        let mut rx = store.subscribe();

        store.dispatch(Action::Redirect(Route::Login));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().redirect, Some(Route::Login));

        store.dispatch(Action::SessionStarted {
            user: user(7),
            token: SecretString::from("jwt"),
        });
        assert!(store.is_authenticated());
        assert!(store.snapshot().redirect.is_none());
    }
}

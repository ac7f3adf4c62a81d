//! The `ShopSphere` facade.
//!
//! Ties configuration, persisted credentials, the transport, the resource
//! clients, the list synchronizers and the state store together. Front ends
//! drive the client through this type and render [`AppState`] snapshots.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use shopsphere_core::{Email, ProductId, UserId};
use tracing::{debug, info, instrument, warn};

use crate::api::{
    AuthApi, CartApi, CartItem, Order, OrdersApi, Product, ProductsApi, RegisterRequest, Review,
    ReviewsApi, User, UserProfile, WishlistApi,
};
use crate::checkout::{self, PaymentDetails, ShippingDetails};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{RestoreError, RestoredSession};
use crate::state::{Action, AppState, Notice, Route, Store};
use crate::storage::CredentialStore;
use crate::sync::{ListSynchronizer, SyncHandle, SyncOutcome};
use crate::transport::{SessionHook, Transport};

/// Details for a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// ShopSphere client.
///
/// Cheap to clone; clones share state, credentials and connections.
#[derive(Clone)]
pub struct ShopSphere {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    store: Store,
    credentials: Arc<dyn CredentialStore>,
    transport: Transport,
    auth: AuthApi,
    products: ProductsApi,
    cart: CartApi,
    orders: OrdersApi,
    wishlist: WishlistApi,
    reviews: ReviewsApi,
    orders_sync: ListSynchronizer,
    cart_sync: ListSynchronizer,
    wishlist_sync: ListSynchronizer,
}

impl std::fmt::Debug for ShopSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSphere")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl ShopSphere {
    /// Create a client over `credentials`.
    ///
    /// The initial state carries the persisted token and recent searches but
    /// is not authenticated; call [`bootstrap`](Self::bootstrap) to restore
    /// the session.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be read or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let persisted = credentials.load()?;
        let store = Store::new(AppState::from_persisted(&persisted));

        let hook_store = store.clone();
        let on_restored: SessionHook = Arc::new(move |restored: &RestoredSession| {
            hook_store.dispatch(Action::SessionStarted {
                user: restored.user.clone(),
                token: restored.token.clone(),
            });
        });

        let transport =
            Transport::with_session_hook(&config, Arc::clone(&credentials), Some(on_restored))?;

        Ok(Self {
            inner: Arc::new(Inner {
                auth: AuthApi::new(transport.clone()),
                products: ProductsApi::new(transport.clone()),
                cart: CartApi::new(transport.clone()),
                orders: OrdersApi::new(transport.clone()),
                wishlist: WishlistApi::new(transport.clone()),
                reviews: ReviewsApi::new(transport.clone()),
                orders_sync: ListSynchronizer::new("orders", config.sync.clone()),
                cart_sync: ListSynchronizer::new("cart", config.sync.clone()),
                wishlist_sync: ListSynchronizer::new("wishlist", config.sync.clone()),
                transport,
                credentials,
                store,
                config,
            }),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The state store. Subscribe to it to observe every change.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Copy of the current state.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.inner.store.snapshot()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.is_authenticated()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.store.with(|state| {
            state
                .auth
                .is_authenticated()
                .then(|| state.auth.user.clone())
                .flatten()
        })
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    #[must_use]
    pub fn products(&self) -> &ProductsApi {
        &self.inner.products
    }

    #[must_use]
    pub fn orders(&self) -> &OrdersApi {
        &self.inner.orders
    }

    #[must_use]
    pub fn reviews(&self) -> &ReviewsApi {
        &self.inner.reviews
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Restore the persisted session at startup.
    ///
    /// Retries unavailable backends on the configured schedule. When every
    /// attempt fails, a stored user backup keeps the session authenticated;
    /// a token without a backup is kept but not authenticated.
    ///
    /// Returns whether the session is authenticated afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisted state cannot be read or written.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<bool> {
        let recovery = self.inner.transport.recovery();
        let delays = &self.inner.config.restore_retry_delays;
        let mut retries = 0;

        loop {
            match recovery.restore_session().await {
                Ok(restored) => {
                    self.inner.credentials.set_user(&restored.user)?;
                    info!(user_id = %restored.user.id, "Session restored");
                    self.inner.store.dispatch(Action::SessionStarted {
                        user: restored.user,
                        token: restored.token,
                    });
                    return Ok(true);
                }
                Err(RestoreError::NoToken) => {
                    self.inner.store.dispatch(Action::LoggedOut);
                    return Ok(false);
                }
                Err(RestoreError::Storage(e)) => return Err(e.into()),
                Err(e) => match delays.get(retries) {
                    Some(&delay) if e.is_retryable() => {
                        warn!(error = %e, retry = retries + 1, delay_ms = %delay.as_millis(), "Session restore failed, retrying");
                        tokio::time::sleep(delay).await;
                        retries += 1;
                    }
                    _ => {
                        warn!(error = %e, "Session restore failed, reconciling from storage");
                        return self.reconcile_session();
                    }
                },
            }
        }
    }

    /// Settle auth state from storage after restore gave up.
    fn reconcile_session(&self) -> Result<bool> {
        let persisted = self.inner.credentials.load()?;
        match (persisted.token, persisted.user) {
            (Some(token), Some(user)) => {
                info!(user_id = %user.id, "Using stored user backup");
                self.inner
                    .store
                    .dispatch(Action::SessionStarted { user, token });
                Ok(true)
            }
            (Some(token), None) => {
                self.inner
                    .store
                    .dispatch(Action::TokenLoaded(Some(token)));
                Ok(false)
            }
            (None, _) => {
                self.inner.store.dispatch(Action::LoggedOut);
                Ok(false)
            }
        }
    }

    /// Sign in and persist the credential.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Email`] for a malformed email, otherwise an
    /// error if the backend rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User> {
        let email = Email::parse(email)?;
        let result = self.inner.auth.login(&email, password).await;
        let response = self.report(result, |_| "Login successful".to_string())?;
        self.start_session(response.token, response.user)
    }

    /// Create an account and sign into it.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed input or if the backend refuses the
    /// registration.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let email = Email::parse(&registration.email)?;
        if registration.password.expose_secret().is_empty() {
            return Err(ClientError::InvalidInput("Password is required".to_string()));
        }

        let request = RegisterRequest {
            email,
            password: registration.password.expose_secret().to_string(),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            phone: registration
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        };
        let result = self.inner.auth.register(&request).await;
        let response = self.report(result, |_| "Registration successful".to_string())?;
        self.start_session(response.token, response.user)
    }

    fn start_session(&self, token: String, user: User) -> Result<User> {
        let token = SecretString::from(token);
        self.inner.credentials.set_credential(&token, &user)?;
        self.inner.store.dispatch(Action::SessionStarted {
            user: user.clone(),
            token,
        });
        Ok(user)
    }

    /// Forget the credential and all per-user state.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be written.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.inner.credentials.clear_credential()?;
        self.inner.store.dispatch(Action::LoggedOut);
        self.notify(Notice::Success("Logged out".to_string()));
        info!("Logged out");
        Ok(())
    }

    /// Full profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session.
    pub async fn profile(&self) -> Result<UserProfile> {
        let user = self.require_session()?;
        Ok(self.inner.auth.profile(user).await?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Load the catalog into state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn load_products(&self, category: Option<&str>) -> Result<Vec<Product>> {
        let products = match category {
            Some(category) => self.inner.products.by_category(category).await?,
            None => self.inner.products.list().await?,
        };
        self.inner
            .store
            .dispatch(Action::ProductsLoaded(products.clone()));
        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns an error whose [`is_not_found`](ClientError::is_not_found) is
    /// true for an unknown product.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        Ok(self.inner.products.get(id).await?)
    }

    /// Search the catalog and remember the query.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] for a blank query, otherwise an
    /// error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidInput(
                "Search query is empty".to_string(),
            ));
        }

        let searches = self.inner.credentials.record_search(query)?;
        self.inner
            .store
            .dispatch(Action::RecentSearchesUpdated(searches));

        let results = self.inner.products.search(query).await?;
        self.inner
            .store
            .dispatch(Action::ProductsLoaded(results.clone()));
        Ok(results)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add `quantity` units of `product` to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] before any request when there
    /// is no session.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product: ProductId, quantity: u32) -> Result<CartItem> {
        let user = self.require_session()?;
        if quantity == 0 {
            return Err(ClientError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let result = self.inner.cart.add(user, product, quantity).await;
        let line = self.report(result, |line| format!("{} added to cart", line.product.name))?;
        self.inner
            .store
            .dispatch(Action::CartItemUpserted(line.clone()));
        Ok(line)
    }

    /// Set the quantity of `product`. Zero removes the line.
    ///
    /// Returns the updated line, or `None` if it was removed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] before any request when there
    /// is no session.
    #[instrument(skip(self))]
    pub async fn update_cart_quantity(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<Option<CartItem>> {
        let user = self.require_session()?;
        if quantity == 0 {
            self.remove_from_cart(product).await?;
            return Ok(None);
        }

        let result = self.inner.cart.update(user, product, quantity).await;
        let line = self.report(result, |_| "Cart updated".to_string())?;
        match &line {
            Some(line) => self
                .inner
                .store
                .dispatch(Action::CartItemUpserted(line.clone())),
            None => self.inner.store.dispatch(Action::CartItemRemoved(product)),
        }
        Ok(line)
    }

    /// Remove `product` from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] before any request when there
    /// is no session.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product: ProductId) -> Result<()> {
        let user = self.require_session()?;
        let result = self.inner.cart.remove(user, product).await;
        self.report(result, |_| "Removed from cart".to_string())?;
        self.inner.store.dispatch(Action::CartItemRemoved(product));
        Ok(())
    }

    /// Fetch the cart once, without retries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session, otherwise
    /// an error if the request fails.
    pub async fn load_cart(&self) -> Result<Vec<CartItem>> {
        let user = self.require_session()?;
        self.inner.store.dispatch(Action::CartLoading);
        match self.inner.cart.get(user).await {
            Ok(items) => {
                self.inner.store.dispatch(Action::CartLoaded(items.clone()));
                Ok(items)
            }
            Err(e) => {
                self.inner.store.dispatch(Action::CartLoaded(Vec::new()));
                Err(e.into())
            }
        }
    }

    /// Products often bought with what is in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session, otherwise
    /// an error if the request fails.
    pub async fn cart_recommendations(&self) -> Result<Vec<Product>> {
        let user = self.require_session()?;
        Ok(self.inner.cart.recommendations(user).await?)
    }

    /// Synchronize the cart after a mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session.
    pub async fn sync_cart(&self) -> Result<SyncOutcome<CartItem>> {
        let user = self.require_session()?;
        self.inner.store.dispatch(Action::CartLoading);
        let api = self.inner.cart.clone();
        let outcome = self
            .inner
            .cart_sync
            .sync(move || {
                let api = api.clone();
                async move { api.get(user).await }
            })
            .await;
        self.inner
            .store
            .dispatch(Action::CartLoaded(outcome.items.clone()));
        Ok(outcome)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] before any request when there
    /// is no session.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(&self, product: ProductId) -> Result<()> {
        self.require_session()?;
        let result = self.inner.wishlist.add(product).await;
        self.report(result, |_| "Added to wishlist".to_string())?;
        self.inner.store.dispatch(Action::WishlistStatus {
            product_id: product,
            in_wishlist: true,
        });
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] before any request when there
    /// is no session.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, product: ProductId) -> Result<()> {
        self.require_session()?;
        let result = self.inner.wishlist.remove(product).await;
        self.report(result, |_| "Removed from wishlist".to_string())?;
        self.inner.store.dispatch(Action::WishlistStatus {
            product_id: product,
            in_wishlist: false,
        });
        Ok(())
    }

    /// Whether `product` is on the wishlist. Without a session it is not.
    ///
    /// A failed check leaves the store untouched and answers from the last
    /// known membership.
    pub async fn check_wishlist(&self, product: ProductId) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        match self.inner.wishlist.check(product).await {
            Ok(in_wishlist) => {
                self.inner.store.dispatch(Action::WishlistStatus {
                    product_id: product,
                    in_wishlist,
                });
                in_wishlist
            }
            Err(e) => {
                debug!(error = %e, %product, "Wishlist check failed, keeping known status");
                self.inner
                    .store
                    .with(|state| state.wishlist.contains(product))
            }
        }
    }

    /// Fetch the wishlist once, without retries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session, otherwise
    /// an error if the request fails.
    pub async fn load_wishlist(&self) -> Result<Vec<Product>> {
        self.require_session()?;
        self.inner.store.dispatch(Action::WishlistLoading);
        match self.inner.wishlist.list().await {
            Ok(items) => {
                self.inner
                    .store
                    .dispatch(Action::WishlistLoaded(items.clone()));
                Ok(items)
            }
            Err(e) => {
                self.inner.store.dispatch(Action::WishlistLoaded(Vec::new()));
                self.notify(Notice::Error(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Synchronize the wishlist after a mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session.
    pub async fn sync_wishlist(&self) -> Result<SyncOutcome<Product>> {
        self.require_session()?;
        self.inner.store.dispatch(Action::WishlistLoading);
        let api = self.inner.wishlist.clone();
        let outcome = self
            .inner
            .wishlist_sync
            .sync(move || {
                let api = api.clone();
                async move { api.list().await }
            })
            .await;
        self.inner
            .store
            .dispatch(Action::WishlistLoaded(outcome.items.clone()));
        Ok(outcome)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Synchronize the order list, starting with the settle delay.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session.
    pub async fn sync_orders(&self) -> Result<SyncOutcome<Order>> {
        self.run_orders_cycle(false).await
    }

    /// Manual refresh: a fresh cycle without the settle delay.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session.
    pub async fn refresh_orders(&self) -> Result<SyncOutcome<Order>> {
        self.run_orders_cycle(true).await
    }

    async fn run_orders_cycle(&self, refresh: bool) -> Result<SyncOutcome<Order>> {
        let user = self.require_session()?;
        self.inner.store.dispatch(Action::OrdersLoading);

        let api = self.inner.orders.clone();
        let fetch = move || {
            let api = api.clone();
            async move { api.mine(Some(user)).await }
        };
        let outcome = if refresh {
            self.inner.orders_sync.refresh(fetch).await
        } else {
            self.inner.orders_sync.sync(fetch).await
        };

        self.inner
            .store
            .dispatch(Action::OrdersLoaded(outcome.items.clone()));
        Ok(outcome)
    }

    /// Synchronize orders in the background.
    ///
    /// The result is dispatched into the store when the cycle ends. Drop or
    /// cancel the handle to abandon it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] without a session.
    pub fn watch_orders(&self) -> Result<SyncHandle<Order>> {
        let user = self.require_session()?;
        self.inner.store.dispatch(Action::OrdersLoading);

        let api = self.inner.orders.clone();
        let store = self.inner.store.clone();
        Ok(self.inner.orders_sync.spawn(
            move || {
                let api = api.clone();
                async move { api.mine(Some(user)).await }
            },
            move |outcome| store.dispatch(Action::OrdersLoaded(outcome.items.clone())),
        ))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Pay for the cart and place the order.
    ///
    /// Payment is simulated: details are checked, the configured delay
    /// elapses and a payment id is generated. On success the cart is cleared;
    /// follow up with [`sync_orders`](Self::sync_orders) to see the order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`], [`ClientError::EmptyCart`],
    /// [`ClientError::InvalidInput`] or [`ClientError::Payment`] before any
    /// order is sent, otherwise an error if the backend rejects the order.
    #[instrument(skip(self, shipping, payment), fields(method = %payment.method))]
    pub async fn checkout(
        &self,
        shipping: &ShippingDetails,
        payment: &PaymentDetails,
    ) -> Result<Order> {
        let user = self.require_session()?;

        if let Some(field) = shipping.missing_field() {
            return Err(ClientError::InvalidInput(format!(
                "Shipping {field} is required"
            )));
        }
        payment.validate()?;

        let mut cart = self.inner.store.with(|state| state.cart.items.clone());
        if cart.is_empty() {
            cart = self.load_cart().await?;
        }
        if cart.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        info!(delay_ms = %self.inner.config.payment_delay.as_millis(), "Processing payment");
        tokio::time::sleep(self.inner.config.payment_delay).await;
        let payment_id = checkout::payment_id();
        info!(payment_id = %payment_id, "Payment accepted");

        let order = checkout::build_order(user, &cart, shipping, payment.method, Some(payment_id));
        let result = self.inner.orders.create(&order).await;
        let placed = self.report(result, |order| format!("Order #{} placed", order.id))?;

        self.inner.store.dispatch(Action::CartCleared);
        Ok(placed)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Review `product`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRequired`] before any request when there
    /// is no session.
    #[instrument(skip(self, comment))]
    pub async fn create_review(
        &self,
        product: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review> {
        self.require_session()?;
        let result = self.inner.reviews.create(product, rating, comment).await;
        let review = self.report(result, |_| "Review submitted".to_string())?;
        self.inner.products.invalidate(product).await;
        Ok(review)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Id of the signed-in user, or a redirect to login.
    fn require_session(&self) -> Result<UserId> {
        if let Some(user) = self.current_user() {
            return Ok(user.id);
        }
        warn!("Operation requires a session, redirecting to login");
        self.inner.store.dispatch(Action::Redirect(Route::Login));
        self.notify(Notice::Error(ClientError::LoginRequired.to_string()));
        Err(ClientError::LoginRequired)
    }

    /// Turn a mutation result into a notice and a facade result.
    fn report<T, E>(
        &self,
        result: std::result::Result<T, E>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T>
    where
        E: Into<ClientError>,
    {
        match result {
            Ok(value) => {
                self.notify(Notice::Success(success(&value)));
                Ok(value)
            }
            Err(e) => {
                let err = e.into();
                self.notify(Notice::Error(err.user_message()));
                Err(err)
            }
        }
    }

    fn notify(&self, notice: Notice) {
        self.inner.store.dispatch(Action::Notify(notice));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::{MemoryStore, PersistedState};

    fn offline_config() -> ClientConfig {
        // Port 9 (discard) refuses connections on test machines.
        let mut config = ClientConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        config.request_timeout = Duration::from_secs(2);
        config.restore_retry_delays = vec![Duration::from_millis(1)];
        config
    }

    fn user() -> User {
        serde_json::from_value(serde_json::json!({"id": 5, "email": "asha@shop.in"})).unwrap()
    }

    #[tokio::test]
    async fn test_guarded_mutation_redirects_without_session() {
        let client = ShopSphere::new(offline_config(), Arc::new(MemoryStore::new())).unwrap();

        let err = client.add_to_cart(ProductId::new(1), 1).await.unwrap_err();
        assert!(matches!(err, ClientError::LoginRequired));

        let state = client.state();
        assert_eq!(state.redirect, Some(Route::Login));
        assert!(state.notice.unwrap().is_error());
    }

    #[tokio::test]
    async fn test_bootstrap_without_token() {
        let store = Arc::new(MemoryStore::new());
        let client = ShopSphere::new(offline_config(), store.clone()).unwrap();

        assert!(!client.bootstrap().await.unwrap());
        assert!(!client.is_authenticated());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_offline_uses_user_backup() {
        let store = Arc::new(MemoryStore::with_state(PersistedState {
            token: Some(SecretString::from("jwt")),
            user: Some(user()),
            ..PersistedState::default()
        }));
        let client = ShopSphere::new(offline_config(), store.clone()).unwrap();

        assert!(client.bootstrap().await.unwrap());
        assert_eq!(client.current_user().unwrap().id, UserId::new(5));
        assert!(store.token().unwrap().is_some());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_offline_keeps_token_without_backup() {
        let store = Arc::new(MemoryStore::with_state(PersistedState {
            token: Some(SecretString::from("jwt")),
            ..PersistedState::default()
        }));
        let client = ShopSphere::new(offline_config(), store.clone()).unwrap();

        assert!(!client.bootstrap().await.unwrap());
        assert!(!client.is_authenticated());
        assert!(client.state().auth.token.is_some());
        assert!(store.token().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected_without_recording() {
        let store = Arc::new(MemoryStore::new());
        let client = ShopSphere::new(offline_config(), store.clone()).unwrap();

        assert!(matches!(
            client.search_products("   ").await,
            Err(ClientError::InvalidInput(_))
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_logout_keeps_recent_searches() {
        let store = Arc::new(MemoryStore::with_state(PersistedState {
            token: Some(SecretString::from("jwt")),
            user: Some(user()),
            recent_searches: vec!["saree".to_string()].into(),
        }));
        let client = ShopSphere::new(offline_config(), store.clone()).unwrap();

        client.logout().unwrap();
        let persisted = store.load().unwrap();
        assert!(persisted.token.is_none());
        assert_eq!(persisted.recent_searches.as_slice(), ["saree"]);
        assert!(!client.is_authenticated());
    }
}

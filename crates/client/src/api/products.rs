//! Product catalog endpoints.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shopsphere_core::ProductId;
use tracing::{debug, info, instrument};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::types::{Product, ProductInput};
use crate::transport::{ApiRequest, Transport};

/// Client for `/products`.
///
/// Reads are cached for 5 minutes. Search results are never cached, and
/// admin writes drop the whole cache.
#[derive(Clone)]
pub struct ProductsApi {
    inner: Arc<ProductsApiInner>,
}

struct ProductsApiInner {
    transport: Transport,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ProductsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductsApi")
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl ProductsApi {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ProductsApiInner { transport, cache }),
        }
    }

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_list(CacheKey::All, ApiRequest::get("/products"))
            .await
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = ApiRequest::get(format!("/products/{id}"));
        let product: Product = self
            .inner
            .transport
            .json_opt(&request)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Full-text search. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let request = ApiRequest::get("/products/search").query("q", query.trim());
        self.inner.transport.json(&request).await
    }

    /// Products in `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        self.cached_list(
            CacheKey::Category(category.to_string()),
            ApiRequest::get(format!("/products/category/{category}")),
        )
        .await
    }

    /// Highest rated products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn top_rated(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_list(CacheKey::TopRated, ApiRequest::get("/products/top-rated"))
            .await
    }

    /// Products frequently bought with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn recommendations(&self, id: ProductId) -> Result<Vec<Product>, ApiError> {
        self.cached_list(
            CacheKey::Recommendations(id),
            ApiRequest::get(format!("/products/{id}/recommendations")),
        )
        .await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Create a product. Requires an admin session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let request = ApiRequest::post("/products").json(input)?;
        let product: Product = self.inner.transport.json(&request).await?;
        self.invalidate_all().await;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields. Requires an admin session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, ApiError> {
        let request = ApiRequest::put(format!("/products/{id}")).json(input)?;
        let product: Product = self.inner.transport.json(&request).await?;
        self.invalidate_all().await;
        info!("Product updated");
        Ok(product)
    }

    /// Delete a product. Requires an admin session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/products/{id}"));
        self.inner.transport.execute(&request).await?;
        self.invalidate_all().await;
        info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop a single cached product.
    pub async fn invalidate(&self, id: ProductId) {
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
    }

    /// Drop everything cached.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    async fn cached_list(
        &self,
        key: CacheKey,
        request: ApiRequest,
    ) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(key = ?key, "Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.inner.transport.json(&request).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }
}

//! Cache types for product reads.

use shopsphere_core::ProductId;

use super::types::Product;

/// Cache key for product reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    All,
    Category(String),
    TopRated,
    Recommendations(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

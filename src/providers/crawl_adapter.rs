use async_trait::async_trait;
use serde::{ Deserialize, Serialize };

use crate::error::Result;

/// Volatile commerce fields, copied into a snapshot at observation time.
/// Prices are in the marketplace's integer minor units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommerceFields {
    pub stock: i32,
    pub sold: i32,
    pub historical_sold: i32,
    pub liked_count: i32,
    pub comment_count: i32,
    pub price: i64,
    pub price_min: i64,
    pub price_max: i64,
    pub price_min_before_discount: i64,
    pub price_max_before_discount: i64,
    pub price_before_discount: i64,
    pub raw_discount: f64,
}

/// One product as listed on a shop page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub external_id: i64,
    pub shop_name: String,
    pub shop_rating: f64,
    pub name: String,
    pub commerce: CommerceFields,
    pub image_ids: Vec<String>,
}

#[async_trait]
pub trait CrawlAdapter: Send + Sync {
    /// List the products of a shop, in page order.
    ///
    /// `Ok(vec![])` means the shop has no products; a failed fetch is an `Err`.
    async fn fetch_products(&self, shop_id: i64) -> Result<Vec<ProductListing>>;
}

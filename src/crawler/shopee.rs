use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ AppError, Result };
use crate::providers::{ CommerceFields, CrawlAdapter, ProductListing };

const IMAGE_BASE_URL: &str = "https://down-vn.img.susercontent.com/file";
const MAX_RETRIES: u32 = 3;

pub fn image_url(image_id: &str) -> String {
    format!("{}/{}", IMAGE_BASE_URL, image_id)
}

/// Crawls a shop's product tab through the public recommend endpoint.
pub struct ShopeeCrawler {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    error: i64,
    data: Option<RecommendData>,
}

#[derive(Deserialize)]
struct RecommendData {
    #[serde(default)]
    sections: Vec<RecommendSection>,
}

#[derive(Deserialize)]
struct RecommendSection {
    data: Option<SectionData>,
}

#[derive(Deserialize)]
struct SectionData {
    #[serde(default)]
    item: Vec<ShopeeItem>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ShopeeItem {
    itemid: i64,
    shop_name: String,
    shop_rating: f64,
    name: String,
    stock: i32,
    sold: i32,
    historical_sold: i32,
    liked_count: i32,
    cmt_count: i32,
    price: i64,
    price_min: i64,
    price_max: i64,
    price_min_before_discount: i64,
    price_max_before_discount: i64,
    price_before_discount: i64,
    raw_discount: f64,
    images: Vec<String>,
}

impl From<ShopeeItem> for ProductListing {
    fn from(item: ShopeeItem) -> Self {
        ProductListing {
            external_id: item.itemid,
            shop_name: item.shop_name,
            shop_rating: item.shop_rating,
            name: item.name,
            commerce: CommerceFields {
                stock: item.stock,
                sold: item.sold,
                historical_sold: item.historical_sold,
                liked_count: item.liked_count,
                comment_count: item.cmt_count,
                price: item.price,
                price_min: item.price_min,
                price_max: item.price_max,
                price_min_before_discount: item.price_min_before_discount,
                price_max_before_discount: item.price_max_before_discount,
                price_before_discount: item.price_before_discount,
                raw_discount: item.raw_discount,
            },
            image_ids: item.images,
        }
    }
}

/// Decode a recommend payload. A non-zero `error` means the request was blocked.
fn parse_listings(body: &str) -> Result<Vec<ProductListing>> {
    let response: RecommendResponse = serde_json
        ::from_str(body)
        .map_err(|e| AppError::External(format!("Failed to parse Shopee response: {}", e)))?;

    if response.error != 0 {
        return Err(AppError::External(format!("Shopee blocked the request (error {})", response.error)));
    }

    let items = response.data
        .and_then(|data| data.sections.into_iter().next())
        .and_then(|section| section.data)
        .map(|data| data.item)
        .unwrap_or_default();

    Ok(items.into_iter().map(ProductListing::from).collect())
}

impl ShopeeCrawler {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)")
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn recommend_url(&self, shop_id: i64) -> String {
        format!(
            "{}/api/v4/recommend/recommend?bundle=shop_page_product_tab_main&limit=999&offset=0&section=shop_page_product_tab_main_sec&shopid={}",
            self.base_url,
            shop_id
        )
    }

    /// GET with backoff on 429
    async fn fetch_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            let response = self.client
                .get(url)
                .send().await
                .map_err(|e| AppError::External(format!("Shopee request failed: {}", e)))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let wait_secs = 2u64.pow(attempt + 1);
                tracing::debug!(attempt, wait_secs, "shopee rate limited, backing off");
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                last_err = Some(AppError::External("Shopee rate limited".to_string()));
                continue;
            }

            if !response.status().is_success() {
                return Err(
                    AppError::External(format!("Shopee returned status: {}", response.status()))
                );
            }

            return Ok(response);
        }
        Err(last_err.unwrap_or_else(|| AppError::External("Shopee request failed after retries".to_string())))
    }
}

#[async_trait]
impl CrawlAdapter for ShopeeCrawler {
    async fn fetch_products(&self, shop_id: i64) -> Result<Vec<ProductListing>> {
        let url = self.recommend_url(shop_id);
        let body = self
            .fetch_with_retry(&url).await?
            .text().await
            .map_err(|e| AppError::External(format!("Failed to read Shopee response: {}", e)))?;

        let listings = parse_listings(&body)?;
        tracing::debug!(shop_id, count = listings.len(), "fetched shop listings");
        Ok(listings)
    }
}

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::crawler::{ shopee::image_url, ProductUrl };
use crate::db::entity::{ product, shop };
use crate::db::{ ProductRepository, ShopRepository, SnapshotRepository };
use crate::error::{ AppError, Result };
use crate::providers::{ CrawlAdapter, ProductListing };
use crate::utils::{ for_each_bounded, with_timeout };

/// Per-shop counts from one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShopRefresh {
    pub listings: usize,
    pub snapshots_recorded: usize,
    pub snapshots_failed: usize,
}

/// Keeps shops and products in step with the marketplace.
pub struct CatalogService {
    crawler: Arc<dyn CrawlAdapter>,
    shops: ShopRepository,
    products: ProductRepository,
    snapshots: SnapshotRepository,
    monitor: MonitorConfig,
}

impl CatalogService {
    pub fn new(
        crawler: Arc<dyn CrawlAdapter>,
        shops: ShopRepository,
        products: ProductRepository,
        snapshots: SnapshotRepository,
        monitor: MonitorConfig
    ) -> Self {
        Self {
            crawler,
            shops,
            products,
            snapshots,
            monitor,
        }
    }

    pub async fn known_shops(&self) -> Result<Vec<shop::Model>> {
        with_timeout(self.monitor.store_timeout, "list shops", self.shops.find_all()).await
    }

    async fn fetch(&self, shop_id: i64) -> Result<Vec<ProductListing>> {
        with_timeout(
            self.monitor.crawl_timeout,
            "crawl shop",
            self.crawler.fetch_products(shop_id)
        ).await
    }

    /// Resolve a product that is not stored yet by importing its whole shop.
    ///
    /// The shop is created on first sight, which enrolls it in later cycles.
    pub async fn import_product(&self, url: ProductUrl) -> Result<product::Model> {
        let listings = self.fetch(url.shop_id).await?;

        let first = listings.first().ok_or(AppError::ProductNotFound)?;
        if !listings.iter().any(|l| l.external_id == url.item_id) {
            return Err(AppError::ProductNotFound);
        }

        let store_timeout = self.monitor.store_timeout;
        let shop = match
            with_timeout(store_timeout, "find shop", self.shops.find_by_shop_id(url.shop_id)).await?
        {
            Some(shop) => shop,
            None => self.create_shop(url.shop_id, first).await?,
        };

        tracing::info!(shop_id = url.shop_id, listings = listings.len(), "importing shop catalog");

        let products = self.products.clone();
        let shop_uuid = shop.id;
        let results = for_each_bounded(listings, self.monitor.max_concurrent_products, move |listing| {
            let products = products.clone();
            async move {
                let stored = upsert(&products, shop_uuid, &listing, store_timeout).await;
                (listing.external_id, stored)
            }
        }).await;

        let mut requested = None;
        for (external_id, stored) in results {
            match stored {
                Ok(model) if external_id == url.item_id => {
                    requested = Some(model);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(shop_id = url.shop_id, external_id, error = %e, "product upsert failed");
                    if external_id == url.item_id {
                        return Err(e);
                    }
                }
            }
        }

        requested.ok_or(AppError::ProductNotFound)
    }

    /// Create the shop, or reuse the row a concurrent import inserted first.
    async fn create_shop(&self, shop_id: i64, first: &ProductListing) -> Result<shop::Model> {
        let store_timeout = self.monitor.store_timeout;
        let created = with_timeout(
            store_timeout,
            "create shop",
            self.shops.create(shop_id, &first.shop_name, first.shop_rating)
        ).await;

        match created {
            Err(e) if e.is_unique_violation() => {
                let existing = with_timeout(
                    store_timeout,
                    "find shop",
                    self.shops.find_by_shop_id(shop_id)
                ).await?;
                existing.ok_or(e)
            }
            other => other,
        }
    }

    /// Crawl one shop, refresh its rating, upsert every product and record
    /// today's snapshot for each. Per-product failures are logged and counted.
    pub async fn refresh_shop(&self, shop: shop::Model) -> Result<ShopRefresh> {
        let listings = self.fetch(shop.shop_id).await?;
        let store_timeout = self.monitor.store_timeout;

        let Some(first) = listings.first() else {
            tracing::debug!(shop_id = shop.shop_id, "shop returned no products");
            return Ok(ShopRefresh::default());
        };

        let shop_id = shop.shop_id;
        let shop_uuid = shop.id;
        if
            let Err(e) = with_timeout(
                store_timeout,
                "update shop rating",
                self.shops.update_rating(shop, first.shop_rating)
            ).await
        {
            tracing::warn!(shop_id, error = %e, "shop rating refresh failed");
        }

        let mut refresh = ShopRefresh {
            listings: listings.len(),
            ..Default::default()
        };

        let products = self.products.clone();
        let snapshots = self.snapshots.clone();
        let results = for_each_bounded(listings, self.monitor.max_concurrent_products, move |listing| {
            let products = products.clone();
            let snapshots = snapshots.clone();
            async move {
                let recorded: Result<Uuid> = async {
                    let product = upsert(&products, shop_uuid, &listing, store_timeout).await?;
                    with_timeout(
                        store_timeout,
                        "record snapshot",
                        snapshots.record_snapshot(product.id, &listing.commerce)
                    ).await
                }.await;
                (listing.external_id, recorded)
            }
        }).await;

        for (external_id, recorded) in results {
            match recorded {
                Ok(_) => {
                    refresh.snapshots_recorded += 1;
                }
                Err(e) => {
                    tracing::warn!(shop_id, external_id, error = %e, "skipping product this cycle");
                    refresh.snapshots_failed += 1;
                }
            }
        }

        Ok(refresh)
    }
}

async fn upsert(
    products: &ProductRepository,
    shop_id: Uuid,
    listing: &ProductListing,
    store_timeout: Duration
) -> Result<product::Model> {
    let images = listing.image_ids
        .iter()
        .map(|id| image_url(id))
        .collect::<Vec<_>>();
    let stored = with_timeout(
        store_timeout,
        "upsert product",
        products.upsert_listing(shop_id, listing, images.clone())
    ).await;

    match stored {
        // Another import inserted it between our lookup and insert; this pass updates it
        Err(e) if e.is_unique_violation() => {
            with_timeout(store_timeout, "upsert product", products.upsert_listing(shop_id, listing, images)).await
        }
        other => other,
    }
}

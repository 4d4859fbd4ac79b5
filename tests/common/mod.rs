#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use async_trait::async_trait;
use migration::{ Migrator, MigratorTrait };
use sea_orm::{ ConnectOptions, ConnectionTrait, Database, DatabaseConnection };
use uuid::Uuid;

use price_tracker::config::MonitorConfig;
use price_tracker::db::entity::{ product, user };
use price_tracker::db::{
    ConditionRepository,
    ProductRepository,
    ShopRepository,
    SnapshotRepository,
    TrackingRepository,
    UserRepository,
};
use price_tracker::error::{ AppError, Result };
use price_tracker::price_checker::PriceChecker;
use price_tracker::providers::{
    CommerceFields,
    CrawlAdapter,
    EmailMessage,
    Notifier,
    ProductListing,
};
use price_tracker::scheduler::Scheduler;
use price_tracker::services::{ CatalogService, NotificationService, TrackingService };

pub const SHOP_ID: i64 = 88201679;
pub const ITEM_ID: i64 = 1738382619;
pub const OTHER_ITEM_ID: i64 = 1738382620;

pub fn product_url(shop_id: i64, item_id: i64) -> String {
    format!("https://shopee.vn/Ao-thun-nam-i.{}.{}?sp_atk=abc", shop_id, item_id)
}

pub fn listing(external_id: i64, price: i64) -> ProductListing {
    ProductListing {
        external_id,
        shop_name: "Local Brand".to_string(),
        shop_rating: 4.8,
        name: format!("Item {}", external_id),
        commerce: commerce(price),
        image_ids: vec![format!("img-{}", external_id)],
    }
}

pub fn commerce(price: i64) -> CommerceFields {
    CommerceFields {
        stock: 10,
        sold: 1,
        historical_sold: 100,
        liked_count: 5,
        comment_count: 2,
        price,
        price_min: price,
        price_max: price,
        price_min_before_discount: price,
        price_max_before_discount: price,
        price_before_discount: price,
        raw_discount: 0.0,
    }
}

/// Serves canned listings per shop; shops without an entry fail like a blocked crawl.
#[derive(Default)]
pub struct StaticCrawler {
    shops: Mutex<HashMap<i64, Vec<ProductListing>>>,
    calls: Mutex<Vec<i64>>,
}

impl StaticCrawler {
    pub fn set_listings(&self, shop_id: i64, listings: Vec<ProductListing>) {
        self.shops.lock().unwrap().insert(shop_id, listings);
    }

    pub fn remove_shop(&self, shop_id: i64) {
        self.shops.lock().unwrap().remove(&shop_id);
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrawlAdapter for StaticCrawler {
    async fn fetch_products(&self, shop_id: i64) -> Result<Vec<ProductListing>> {
        self.calls.lock().unwrap().push(shop_id);
        self.shops
            .lock()
            .unwrap()
            .get(&shop_id)
            .cloned()
            .ok_or_else(|| AppError::External(format!("shop {} blocked", shop_id)))
    }
}

/// Records every delivered message; recipients in `failing` get an error instead.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().push(recipient.to_string());
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        let mut to: Vec<String> = self
            .sent()
            .into_iter()
            .map(|m| m.to)
            .collect();
        to.sort();
        to
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.failing.lock().unwrap().contains(&message.to) {
            return Err(AppError::External("relay rejected message".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

pub fn test_monitor() -> MonitorConfig {
    MonitorConfig {
        crawl_interval: Duration::from_millis(50),
        store_timeout: Duration::from_secs(5),
        crawl_timeout: Duration::from_secs(5),
        send_timeout: Duration::from_secs(5),
        max_concurrent_products: 4,
    }
}

/// The whole engine wired against one in-memory database.
pub struct TestEngine {
    pub db: DatabaseConnection,
    pub crawler: Arc<StaticCrawler>,
    pub notifier: Arc<RecordingNotifier>,
    pub users: UserRepository,
    pub products: ProductRepository,
    pub snapshots: SnapshotRepository,
    pub trackings: TrackingRepository,
    pub conditions: ConditionRepository,
    pub catalog: Arc<CatalogService>,
    pub checker: Arc<PriceChecker>,
    pub tracking_service: Arc<TrackingService>,
}

impl TestEngine {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let monitor = test_monitor();

        let crawler = Arc::new(StaticCrawler::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let users = UserRepository::new(db.clone());
        let shops = ShopRepository::new(db.clone());
        let products = ProductRepository::new(db.clone());
        let snapshots = SnapshotRepository::new(db.clone());
        let trackings = TrackingRepository::new(db.clone());
        let conditions = ConditionRepository::new(db.clone());

        let catalog = Arc::new(
            CatalogService::new(
                crawler.clone(),
                shops,
                products.clone(),
                snapshots.clone(),
                monitor.clone()
            )
        );
        let notifications = Arc::new(
            NotificationService::new(notifier.clone(), monitor.send_timeout)
        );
        let checker = Arc::new(
            PriceChecker::new(
                trackings.clone(),
                conditions.clone(),
                snapshots.clone(),
                notifications,
                monitor.store_timeout
            )
        );
        let tracking_service = Arc::new(
            TrackingService::new(
                catalog.clone(),
                users.clone(),
                products.clone(),
                trackings.clone(),
                conditions.clone(),
                monitor.store_timeout
            )
        );

        Self {
            db,
            crawler,
            notifier,
            users,
            products,
            snapshots,
            trackings,
            conditions,
            catalog,
            checker,
            tracking_service,
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.catalog.clone(), self.checker.clone(), test_monitor().crawl_interval)
    }

    pub async fn user(&self, email: &str) -> user::Model {
        self.users.create(email.to_string()).await.expect("Failed to create user")
    }

    /// Seed the crawler with the default shop and track `ITEM_ID` for `user_id`.
    pub async fn track_default(&self, user_id: Uuid, price: i64) -> Uuid {
        self.crawler.set_listings(SHOP_ID, vec![listing(ITEM_ID, price), listing(OTHER_ITEM_ID, 500)]);
        self.tracking_service
            .track(user_id, &product_url(SHOP_ID, ITEM_ID)).await
            .expect("Failed to track product").id
    }

    pub async fn product(&self, external_id: i64) -> product::Model {
        self.products
            .find_by_external_id(external_id).await
            .expect("Failed to load product")
            .expect("Product not imported")
    }

    /// Drop the conditions table so any condition write fails.
    pub async fn break_conditions(&self) {
        self.db.execute_unprepared("DROP TABLE conditions").await.expect("Failed to drop table");
    }

    /// Make every stored condition of `kind` unreadable, so loading that class fails.
    pub async fn corrupt_conditions(&self, kind: &str) {
        self.db
            .execute_unprepared(
                &format!("UPDATE conditions SET created_at = 'not-a-timestamp' WHERE kind = '{}'", kind)
            ).await
            .expect("Failed to corrupt conditions");
    }
}

use std::sync::Arc;

use migration::{ Migrator, MigratorTrait };
use price_tracker::{ AppError, Config, Result };
use price_tracker::db::{
    ConditionRepository,
    ProductRepository,
    ShopRepository,
    SnapshotRepository,
    TrackingRepository,
    UserRepository,
};
use price_tracker::providers::Notifier;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "price_tracker=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;
    let monitor = config.monitor.clone();

    tracing::info!(
        interval_secs = monitor.crawl_interval.as_secs(),
        max_concurrent_products = monitor.max_concurrent_products,
        "Starting price-tracker"
    );

    // The store is required; failing here aborts the process
    let db = sea_orm::Database::connect(&config.database_url).await.map_err(AppError::Database)?;
    tracing::info!("Database connected successfully");

    Migrator::up(&db, None).await.map_err(AppError::Database)?;
    tracing::info!("Migrations completed successfully");

    let crawler = Arc::new(
        price_tracker::crawler::ShopeeCrawler::new(&config.shopee_base_url, monitor.crawl_timeout)?
    );

    let notifier: Arc<dyn Notifier> = match config.mail.clone() {
        Some(mail) => {
            tracing::info!(relay = %mail.api_url, "Mail relay configured");
            Arc::new(price_tracker::mailer::HttpMailer::new(mail, monitor.send_timeout)?)
        }
        None => {
            tracing::warn!("MAIL_API_URL not set, notifications will only be logged");
            Arc::new(price_tracker::mailer::LogMailer)
        }
    };

    let shops = ShopRepository::new(db.clone());
    let products = ProductRepository::new(db.clone());
    let snapshots = SnapshotRepository::new(db.clone());
    let trackings = TrackingRepository::new(db.clone());
    let conditions = ConditionRepository::new(db.clone());
    let users = UserRepository::new(db);

    let catalog = Arc::new(
        price_tracker::services::CatalogService::new(
            crawler,
            shops,
            products.clone(),
            snapshots.clone(),
            monitor.clone()
        )
    );

    let notifications = Arc::new(
        price_tracker::services::NotificationService::new(notifier, monitor.send_timeout)
    );

    let checker = Arc::new(
        price_tracker::price_checker::PriceChecker::new(
            trackings.clone(),
            conditions.clone(),
            snapshots,
            notifications,
            monitor.store_timeout
        )
    );

    let tracking_service = Arc::new(
        price_tracker::services::TrackingService::new(
            catalog.clone(),
            users,
            products,
            trackings,
            conditions,
            monitor.store_timeout
        )
    );

    let shutdown = CancellationToken::new();
    let scheduler = price_tracker::scheduler::Scheduler::new(catalog, checker, monitor.crawl_interval);
    let scheduler_handle = tokio::spawn(scheduler.start(shutdown.clone()));

    let app = price_tracker::api::router(price_tracker::api::AppState::new(tracking_service));

    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let server_shutdown = shutdown.clone();
    axum
        ::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("Shutdown requested, finishing current cycle");
            server_shutdown.cancel();
        }).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Covers the server exiting on its own as well
    shutdown.cancel();
    if let Err(e) = scheduler_handle.await {
        tracing::error!(error = %e, "scheduler task panicked");
    }

    Ok(())
}

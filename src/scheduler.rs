use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::price_checker::PriceChecker;
use crate::services::CatalogService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub shops_crawled: usize,
    pub shops_failed: usize,
    pub snapshots_recorded: usize,
    pub snapshots_failed: usize,
    pub trackings_evaluated: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

/// Drives crawl -> snapshot -> evaluate -> notify on a fixed interval.
pub struct Scheduler {
    catalog: Arc<CatalogService>,
    checker: Arc<PriceChecker>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(catalog: Arc<CatalogService>, checker: Arc<PriceChecker>, interval: Duration) -> Self {
        Self {
            catalog,
            checker,
            interval,
        }
    }

    /// Run cycles until `shutdown` fires. Cancellation is only observed between
    /// cycles; a cycle that has started always finishes.
    pub async fn start(self, shutdown: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "scheduler started");

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let report = self.run_cycle().await;
            tracing::info!(?report, "cycle finished");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("scheduler stopped");
    }

    /// One full pass over every known shop, then every active tracking.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.catalog.known_shops().await {
            Ok(shops) => {
                for shop in shops {
                    let shop_id = shop.shop_id;
                    match self.catalog.refresh_shop(shop).await {
                        Ok(refresh) => {
                            report.shops_crawled += 1;
                            report.snapshots_recorded += refresh.snapshots_recorded;
                            report.snapshots_failed += refresh.snapshots_failed;
                        }
                        Err(e) => {
                            tracing::warn!(shop_id, error = %e, "shop crawl failed");
                            report.shops_failed += 1;
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not list shops, skipping crawl"),
        }

        match self.checker.check_all().await {
            Ok(check) => {
                report.trackings_evaluated = check.evaluated;
                report.notifications_sent = check.sent;
                report.notifications_failed = check.failed;
            }
            Err(e) => tracing::warn!(error = %e, "could not list trackings, skipping evaluation"),
        }

        report
    }
}

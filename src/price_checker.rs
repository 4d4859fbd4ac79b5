use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::db::entity::tracking;
use crate::db::{ ConditionRepository, SnapshotRepository, TrackingRepository };
use crate::enums::ConditionKind;
use crate::error::{ AppError, Result };
use crate::services::evaluator::{ self, PricePair };
use crate::services::{ DispatchOutcome, NotificationService };
use crate::utils::with_timeout;

/// Counts from one evaluation pass over all active trackings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Compares each tracked product's last two daily snapshots against its
/// members' conditions and sends the resulting emails.
pub struct PriceChecker {
    trackings: TrackingRepository,
    conditions: ConditionRepository,
    snapshots: SnapshotRepository,
    notifications: Arc<NotificationService>,
    store_timeout: Duration,
}

impl PriceChecker {
    pub fn new(
        trackings: TrackingRepository,
        conditions: ConditionRepository,
        snapshots: SnapshotRepository,
        notifications: Arc<NotificationService>,
        store_timeout: Duration
    ) -> Self {
        Self {
            trackings,
            conditions,
            snapshots,
            notifications,
            store_timeout,
        }
    }

    /// Evaluate every active tracking, one at a time. Item failures are logged
    /// and skipped; only failing to list the trackings is an error.
    pub async fn check_all(&self) -> Result<CheckReport> {
        let records = with_timeout(
            self.store_timeout,
            "list active trackings",
            self.trackings.find_active()
        ).await?;

        let mut report = CheckReport::default();
        for record in records {
            let tracking_id = record.id;
            match self.check_tracking(&record).await {
                Ok(Some(outcome)) => {
                    report.evaluated += 1;
                    report.sent += outcome.sent;
                    report.failed += outcome.failed;
                }
                Ok(None) => {
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(%tracking_id, error = %e, "skipping tracking this cycle");
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }

    /// `Ok(None)` when the product has fewer than two snapshots.
    ///
    /// The three condition classes run concurrently and are all awaited before
    /// returning, whatever each of them does.
    pub async fn check_tracking(&self, record: &tracking::Model) -> Result<Option<DispatchOutcome>> {
        let product_id = record.product_id.ok_or(AppError::ProductNotFound)?;

        let snapshots = with_timeout(
            self.store_timeout,
            "load snapshots",
            self.snapshots.latest_two(product_id)
        ).await?;

        let Some(pair) = PricePair::from_latest(&snapshots) else {
            tracing::debug!(tracking_id = %record.id, "fewer than two snapshots, nothing to compare");
            return Ok(None);
        };

        let (less, greater, equal) = tokio::join!(
            self.check_class(record, ConditionKind::LessThan, pair),
            self.check_class(record, ConditionKind::GreaterThan, pair),
            self.check_class(record, ConditionKind::Equal, pair)
        );

        let mut outcome = DispatchOutcome::default();
        for (kind, result) in [
            (ConditionKind::LessThan, less),
            (ConditionKind::GreaterThan, greater),
            (ConditionKind::Equal, equal),
        ] {
            match result {
                Ok(sent) => outcome.merge(sent),
                Err(e) => {
                    tracing::warn!(tracking_id = %record.id, %kind, error = %e, "condition check failed");
                }
            }
        }

        Ok(Some(outcome))
    }

    async fn check_class(
        &self,
        record: &tracking::Model,
        kind: ConditionKind,
        pair: PricePair
    ) -> Result<DispatchOutcome> {
        // Cheap exit for class-level triggers before touching the store
        if kind != ConditionKind::Equal && !evaluator::class_triggered(kind, pair) {
            return Ok(DispatchOutcome::default());
        }

        let rows = with_timeout(
            self.store_timeout,
            "load conditions",
            self.conditions.find_active_with_users(record.id, kind)
        ).await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for (row, user) in rows {
            let Some(user) = user else {
                tracing::warn!(tracking_id = %record.id, user_id = %row.user_id, "condition owner missing");
                continue;
            };
            match row.condition() {
                Ok(condition) => candidates.push((condition, user)),
                Err(e) => {
                    tracing::warn!(condition_id = %row.id, error = %e, "unreadable condition");
                }
            }
        }

        let mut notified = HashSet::new();
        let messages = evaluator
            ::evaluate(pair, candidates)
            .into_iter()
            // Class-level triggers notify each user once
            .filter(|(_, user)| kind == ConditionKind::Equal || notified.insert(user.id))
            .map(|(_, user)| {
                NotificationService::render_price_email(&user.email, pair, &record.source_url)
            })
            .collect::<Vec<_>>();

        if messages.is_empty() {
            return Ok(DispatchOutcome::default());
        }

        tracing::info!(tracking_id = %record.id, %kind, count = messages.len(), "price condition met");
        Ok(self.notifications.dispatch(messages).await)
    }
}

use chrono::{ DateTime, Duration, Local, NaiveTime, TimeZone, Utc };
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::db::entity::price_snapshot;
use crate::error::Result;
use crate::providers::CommerceFields;

/// The `[start, start + 24h)` window, in UTC, of the calendar day that `now`
/// falls on in `tz`.
pub fn day_window<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = now.with_timezone(tz).date_naive().and_time(NaiveTime::MIN);
    let start = match tz.from_local_datetime(&local_midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight skipped by a DST jump; fall back to the UTC reading
        None => local_midnight.and_utc(),
    };
    (start, start + Duration::hours(24))
}

/// Append-or-update store for daily price observations.
#[derive(Clone)]
pub struct SnapshotRepository {
    db: DatabaseConnection,
}

impl SnapshotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn record_snapshot(&self, product_id: Uuid, fields: &CommerceFields) -> Result<Uuid> {
        self.record_snapshot_at(product_id, fields, Utc::now()).await
    }

    /// Insert the first snapshot of `now`'s local day, or overwrite the
    /// commerce fields of the one already there. `created_at` is never moved.
    pub async fn record_snapshot_at(
        &self,
        product_id: Uuid,
        fields: &CommerceFields,
        now: DateTime<Utc>
    ) -> Result<Uuid> {
        let (start, end) = day_window(now, &Local);

        let existing = price_snapshot::Entity
            ::find()
            .filter(price_snapshot::Column::ProductId.eq(product_id))
            .filter(price_snapshot::Column::CreatedAt.gte(start))
            .filter(price_snapshot::Column::CreatedAt.lt(end))
            .one(&self.db).await?;

        match existing {
            Some(snapshot) => {
                let mut active: price_snapshot::ActiveModel = snapshot.into();
                apply_fields(&mut active, fields);
                active.updated_at = ActiveValue::Set(now);
                let snapshot = active.update(&self.db).await?;
                Ok(snapshot.id)
            }
            None => {
                let mut active = price_snapshot::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    product_id: ActiveValue::Set(product_id),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                apply_fields(&mut active, fields);
                let snapshot = active.insert(&self.db).await?;
                Ok(snapshot.id)
            }
        }
    }

    /// Up to two most recent snapshots, newest first.
    pub async fn latest_two(&self, product_id: Uuid) -> Result<Vec<price_snapshot::Model>> {
        let snapshots = price_snapshot::Entity
            ::find()
            .filter(price_snapshot::Column::ProductId.eq(product_id))
            .order_by_desc(price_snapshot::Column::CreatedAt)
            .limit(2)
            .all(&self.db).await?;
        Ok(snapshots)
    }
}

fn apply_fields(active: &mut price_snapshot::ActiveModel, c: &CommerceFields) {
    active.stock = ActiveValue::Set(c.stock);
    active.sold = ActiveValue::Set(c.sold);
    active.historical_sold = ActiveValue::Set(c.historical_sold);
    active.liked_count = ActiveValue::Set(c.liked_count);
    active.comment_count = ActiveValue::Set(c.comment_count);
    active.price = ActiveValue::Set(c.price);
    active.price_min = ActiveValue::Set(c.price_min);
    active.price_max = ActiveValue::Set(c.price_max);
    active.price_min_before_discount = ActiveValue::Set(c.price_min_before_discount);
    active.price_max_before_discount = ActiveValue::Set(c.price_max_before_discount);
    active.price_before_discount = ActiveValue::Set(c.price_before_discount);
    active.raw_discount = ActiveValue::Set(c.raw_discount);
}

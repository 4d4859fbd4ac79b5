use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    ModelTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ tracking, tracking_member, Tracking, TrackingMember };
use crate::error::{ AppError, Result };

/// Tracking records and their member sets.
#[derive(Clone)]
pub struct TrackingRepository {
    db: DatabaseConnection,
}

impl TrackingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<tracking::Model>> {
        let record = Tracking::find_by_id(id).one(&self.db).await?;
        Ok(record)
    }

    pub async fn find_by_external_id(&self, external_id: i64) -> Result<Option<tracking::Model>> {
        let record = Tracking::find()
            .filter(tracking::Column::ExternalId.eq(external_id))
            .one(&self.db).await?;
        Ok(record)
    }

    /// New records start active with no members.
    pub async fn create(
        &self,
        external_id: i64,
        product_id: Option<Uuid>,
        source_url: String
    ) -> Result<tracking::Model> {
        let now = Utc::now();
        let record = tracking::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(external_id),
            product_id: Set(product_id),
            source_url: Set(source_url),
            status: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let record = record.insert(&self.db).await?;
        Ok(record)
    }

    /// Hard delete, only used to undo a `create` within the same request.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        Tracking::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn attach_product(
        &self,
        record: tracking::Model,
        product_id: Uuid
    ) -> Result<tracking::Model> {
        let mut active: tracking::ActiveModel = record.into();
        active.product_id = Set(Some(product_id));
        active.updated_at = Set(Utc::now());
        let record = active.update(&self.db).await?;
        Ok(record)
    }

    pub async fn set_status(&self, id: Uuid, status: bool) -> Result<tracking::Model> {
        let record = self.find_by_id(id).await?.ok_or(AppError::TrackingNotFound)?;

        let mut active: tracking::ActiveModel = record.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let record = active.update(&self.db).await?;
        Ok(record)
    }

    /// Every active record that has a resolved product.
    pub async fn find_active(&self) -> Result<Vec<tracking::Model>> {
        let records = Tracking::find()
            .filter(tracking::Column::Status.eq(true))
            .filter(tracking::Column::ProductId.is_not_null())
            .order_by_asc(tracking::Column::CreatedAt)
            .all(&self.db).await?;
        Ok(records)
    }

    // ─── Membership ──────────────────────────────────────────────────────

    pub async fn is_member(&self, tracking_id: Uuid, user_id: Uuid) -> Result<bool> {
        let count = TrackingMember::find()
            .filter(tracking_member::Column::TrackingId.eq(tracking_id))
            .filter(tracking_member::Column::UserId.eq(user_id))
            .count(&self.db).await?;
        Ok(count > 0)
    }

    pub async fn add_member(&self, tracking_id: Uuid, user_id: Uuid) -> Result<tracking_member::Model> {
        let member = tracking_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            tracking_id: Set(tracking_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        };

        let member = member.insert(&self.db).await?;
        Ok(member)
    }

    /// Returns false when the user was not a member.
    pub async fn remove_member(&self, tracking_id: Uuid, user_id: Uuid) -> Result<bool> {
        let member = TrackingMember::find()
            .filter(tracking_member::Column::TrackingId.eq(tracking_id))
            .filter(tracking_member::Column::UserId.eq(user_id))
            .one(&self.db).await?;

        match member {
            Some(member) => {
                member.delete(&self.db).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn member_ids(&self, tracking_id: Uuid) -> Result<Vec<Uuid>> {
        let members = TrackingMember::find()
            .filter(tracking_member::Column::TrackingId.eq(tracking_id))
            .order_by_asc(tracking_member::Column::CreatedAt)
            .all(&self.db).await?;
        Ok(
            members
                .into_iter()
                .map(|m| m.user_id)
                .collect()
        )
    }
}

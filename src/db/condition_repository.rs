use chrono::Utc;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ condition, user, TrackingCondition, User };
use crate::enums::{ Condition, ConditionKind };
use crate::error::Result;

/// Per-user alert rules. Rows are soft-deleted through `active` and never removed.
#[derive(Clone)]
pub struct ConditionRepository {
    db: DatabaseConnection,
}

impl ConditionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        tracking_id: Uuid,
        user_id: Uuid,
        rule: Condition
    ) -> Result<condition::Model> {
        let now = Utc::now();
        let model = condition::ActiveModel {
            id: Set(Uuid::new_v4()),
            tracking_id: Set(tracking_id),
            user_id: Set(user_id),
            kind: Set(rule.kind().as_str().to_string()),
            threshold: Set(rule.threshold()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await?;
        Ok(model)
    }

    /// Active conditions of one class on a record, each joined to its owner.
    /// The user side is `None` when the owner no longer exists.
    pub async fn find_active_with_users(
        &self,
        tracking_id: Uuid,
        kind: ConditionKind
    ) -> Result<Vec<(condition::Model, Option<user::Model>)>> {
        let rows = TrackingCondition::find()
            .find_also_related(User)
            .filter(condition::Column::TrackingId.eq(tracking_id))
            .filter(condition::Column::Kind.eq(kind.as_str()))
            .filter(condition::Column::Active.eq(true))
            .order_by_asc(condition::Column::CreatedAt)
            .all(&self.db).await?;
        Ok(rows)
    }

    /// Deactivate every active condition the user holds on the record.
    pub async fn deactivate_for_member(&self, tracking_id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = TrackingCondition::update_many()
            .col_expr(condition::Column::Active, Expr::value(false))
            .col_expr(condition::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(condition::Column::TrackingId.eq(tracking_id))
            .filter(condition::Column::UserId.eq(user_id))
            .filter(condition::Column::Active.eq(true))
            .exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// Active and inactive rows alike, oldest first.
    pub async fn list_for_member(
        &self,
        tracking_id: Uuid,
        user_id: Uuid
    ) -> Result<Vec<condition::Model>> {
        let rows = TrackingCondition::find()
            .filter(condition::Column::TrackingId.eq(tracking_id))
            .filter(condition::Column::UserId.eq(user_id))
            .order_by_asc(condition::Column::CreatedAt)
            .all(&self.db).await?;
        Ok(rows)
    }
}

use chrono::Utc;
use sea_orm::{ entity::prelude::*, DatabaseConnection, Set };
use uuid::Uuid;

use crate::error::Result;

pub mod entity;
pub use entity::*;

mod shop_repository;
pub use shop_repository::ShopRepository;

mod product_repository;
pub use product_repository::ProductRepository;

mod snapshot_repository;
pub use snapshot_repository::{ day_window, SnapshotRepository };

mod tracking_repository;
pub use tracking_repository::TrackingRepository;

mod condition_repository;
pub use condition_repository::ConditionRepository;

/// Read side of the account directory: resolves a user id to a contact address.
#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, email: String) -> Result<entity::user::Model> {
        let user = entity::user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            created_at: Set(Utc::now()),
        };

        let user = user.insert(&self.db).await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<entity::user::Model>> {
        let user = entity::user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(user)
    }
}

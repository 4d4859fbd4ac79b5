use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::entity::shop;
use crate::error::Result;

#[derive(Clone)]
pub struct ShopRepository {
    db: DatabaseConnection,
}

impl ShopRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_all(&self) -> Result<Vec<shop::Model>> {
        let shops = shop::Entity::find().order_by_asc(shop::Column::CreatedAt).all(&self.db).await?;
        Ok(shops)
    }

    pub async fn find_by_shop_id(&self, shop_id: i64) -> Result<Option<shop::Model>> {
        let shop = shop::Entity
            ::find()
            .filter(shop::Column::ShopId.eq(shop_id))
            .one(&self.db).await?;
        Ok(shop)
    }

    pub async fn create(&self, shop_id: i64, name: &str, rating: f64) -> Result<shop::Model> {
        let now = Utc::now();
        let shop = shop::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            shop_id: ActiveValue::Set(shop_id),
            name: ActiveValue::Set(name.to_string()),
            rating: ActiveValue::Set(rating),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let shop = shop.insert(&self.db).await?;
        Ok(shop)
    }

    /// Rating is the only shop field a crawl refreshes.
    pub async fn update_rating(&self, shop: shop::Model, rating: f64) -> Result<shop::Model> {
        if shop.rating == rating {
            return Ok(shop);
        }

        let mut active: shop::ActiveModel = shop.into();
        active.rating = ActiveValue::Set(rating);
        active.updated_at = ActiveValue::Set(Utc::now());
        let shop = active.update(&self.db).await?;
        Ok(shop)
    }
}

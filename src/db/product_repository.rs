use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::db::entity::product;
use crate::error::Result;
use crate::providers::ProductListing;

#[derive(Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_external_id(&self, external_id: i64) -> Result<Option<product::Model>> {
        let product = product::Entity
            ::find()
            .filter(product::Column::ExternalId.eq(external_id))
            .one(&self.db).await?;
        Ok(product)
    }

    /// Insert or refresh the product row keyed by the listing's external id.
    pub async fn upsert_listing(
        &self,
        shop_id: Uuid,
        listing: &ProductListing,
        images: Vec<String>
    ) -> Result<product::Model> {
        let now = Utc::now();
        let c = &listing.commerce;

        if let Some(existing) = self.find_by_external_id(listing.external_id).await? {
            let mut active: product::ActiveModel = existing.into();
            active.name = ActiveValue::Set(listing.name.clone());
            active.images = ActiveValue::Set(serde_json::json!(images));
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
            active.updated_at = ActiveValue::Set(now);
            let model = active.update(&self.db).await?;
            Ok(model)
        } else {
            let model = product::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                external_id: ActiveValue::Set(listing.external_id),
                shop_id: ActiveValue::Set(shop_id),
                name: ActiveValue::Set(listing.name.clone()),
                images: ActiveValue::Set(serde_json::json!(images)),
                stock: ActiveValue::Set(c.stock),
                sold: ActiveValue::Set(c.sold),
                historical_sold: ActiveValue::Set(c.historical_sold),
                liked_count: ActiveValue::Set(c.liked_count),
                comment_count: ActiveValue::Set(c.comment_count),
                price: ActiveValue::Set(c.price),
                price_min: ActiveValue::Set(c.price_min),
                price_max: ActiveValue::Set(c.price_max),
                price_min_before_discount: ActiveValue::Set(c.price_min_before_discount),
                price_max_before_discount: ActiveValue::Set(c.price_max_before_discount),
                price_before_discount: ActiveValue::Set(c.price_before_discount),
                raw_discount: ActiveValue::Set(c.raw_discount),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = model.insert(&self.db).await?;
            Ok(model)
        }
    }
}

use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Marketplace item id, the dedup key
    #[sea_orm(unique)]
    pub external_id: i64,
    pub shop_id: Uuid,
    pub name: String,
    pub images: Json, // array of image URLs
    pub stock: i32,
    pub sold: i32,
    pub historical_sold: i32,
    pub liked_count: i32,
    pub comment_count: i32,
    pub price: i64,
    pub price_min: i64,
    pub price_max: i64,
    pub price_min_before_discount: i64,
    pub price_max_before_discount: i64,
    pub price_before_discount: i64,
    pub raw_discount: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
}

impl Related<super::shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

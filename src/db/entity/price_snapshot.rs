use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// One commerce observation per product per local calendar day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
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
    /// Set on insert only; same-day re-crawls leave it untouched.
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

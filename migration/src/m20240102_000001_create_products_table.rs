use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Products::Table)
                .if_not_exists()
                .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                // Dedup key: at most one row per marketplace item id
                .col(ColumnDef::new(Products::ExternalId).big_integer().not_null().unique_key())
                .col(ColumnDef::new(Products::ShopId).uuid().not_null())
                .col(ColumnDef::new(Products::Name).string().not_null())
                .col(ColumnDef::new(Products::Images).json().not_null())
                .col(ColumnDef::new(Products::Stock).integer().not_null().default(0))
                .col(ColumnDef::new(Products::Sold).integer().not_null().default(0))
                .col(ColumnDef::new(Products::HistoricalSold).integer().not_null().default(0))
                .col(ColumnDef::new(Products::LikedCount).integer().not_null().default(0))
                .col(ColumnDef::new(Products::CommentCount).integer().not_null().default(0))
                .col(ColumnDef::new(Products::Price).big_integer().not_null())
                .col(ColumnDef::new(Products::PriceMin).big_integer().not_null())
                .col(ColumnDef::new(Products::PriceMax).big_integer().not_null())
                .col(ColumnDef::new(Products::PriceMinBeforeDiscount).big_integer().not_null())
                .col(ColumnDef::new(Products::PriceMaxBeforeDiscount).big_integer().not_null())
                .col(ColumnDef::new(Products::PriceBeforeDiscount).big_integer().not_null())
                .col(ColumnDef::new(Products::RawDiscount).double().not_null().default(0.0))
                .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Products::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_products_shop_id")
                        .from(Products::Table, Products::ShopId)
                        .to(Shops::Table, Shops::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_products_shop_id")
                .table(Products::Table)
                .col(Products::ShopId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    ExternalId,
    ShopId,
    Name,
    Images,
    Stock,
    Sold,
    HistoricalSold,
    LikedCount,
    CommentCount,
    Price,
    PriceMin,
    PriceMax,
    PriceMinBeforeDiscount,
    PriceMaxBeforeDiscount,
    PriceBeforeDiscount,
    RawDiscount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Shops {
    Table,
    Id,
}

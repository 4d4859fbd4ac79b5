use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(PriceSnapshots::Table)
                .if_not_exists()
                .col(ColumnDef::new(PriceSnapshots::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(PriceSnapshots::ProductId).uuid().not_null())
                .col(ColumnDef::new(PriceSnapshots::Stock).integer().not_null().default(0))
                .col(ColumnDef::new(PriceSnapshots::Sold).integer().not_null().default(0))
                .col(ColumnDef::new(PriceSnapshots::HistoricalSold).integer().not_null().default(0))
                .col(ColumnDef::new(PriceSnapshots::LikedCount).integer().not_null().default(0))
                .col(ColumnDef::new(PriceSnapshots::CommentCount).integer().not_null().default(0))
                .col(ColumnDef::new(PriceSnapshots::Price).big_integer().not_null())
                .col(ColumnDef::new(PriceSnapshots::PriceMin).big_integer().not_null())
                .col(ColumnDef::new(PriceSnapshots::PriceMax).big_integer().not_null())
                .col(ColumnDef::new(PriceSnapshots::PriceMinBeforeDiscount).big_integer().not_null())
                .col(ColumnDef::new(PriceSnapshots::PriceMaxBeforeDiscount).big_integer().not_null())
                .col(ColumnDef::new(PriceSnapshots::PriceBeforeDiscount).big_integer().not_null())
                .col(ColumnDef::new(PriceSnapshots::RawDiscount).double().not_null().default(0.0))
                .col(ColumnDef::new(PriceSnapshots::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(PriceSnapshots::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_price_snapshots_product_id")
                        .from(PriceSnapshots::Table, PriceSnapshots::ProductId)
                        .to(Products::Table, Products::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        // Serves both the same-day lookup and the "two most recent" read
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_price_snapshots_product_created")
                .table(PriceSnapshots::Table)
                .col(PriceSnapshots::ProductId)
                .col(PriceSnapshots::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PriceSnapshots::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum PriceSnapshots {
    Table,
    Id,
    ProductId,
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
enum Products {
    Table,
    Id,
}

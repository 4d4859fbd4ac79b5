use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Trackings::Table)
                .if_not_exists()
                .col(ColumnDef::new(Trackings::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Trackings::ExternalId).big_integer().not_null().unique_key())
                .col(ColumnDef::new(Trackings::ProductId).uuid())
                .col(ColumnDef::new(Trackings::SourceUrl).string().not_null())
                .col(ColumnDef::new(Trackings::Status).boolean().not_null().default(true))
                .col(ColumnDef::new(Trackings::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Trackings::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_trackings_product_id")
                        .from(Trackings::Table, Trackings::ProductId)
                        .to(Products::Table, Products::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_trackings_status")
                .table(Trackings::Table)
                .col(Trackings::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Trackings::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Trackings {
    Table,
    Id,
    ExternalId,
    ProductId,
    SourceUrl,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
}

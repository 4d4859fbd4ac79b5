use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Shops::Table)
                .if_not_exists()
                .col(ColumnDef::new(Shops::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Shops::ShopId).big_integer().not_null().unique_key())
                .col(ColumnDef::new(Shops::Name).string().not_null())
                .col(ColumnDef::new(Shops::Rating).double().not_null().default(0.0))
                .col(ColumnDef::new(Shops::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Shops::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Shops::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Shops {
    Table,
    Id,
    ShopId,
    Name,
    Rating,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Conditions::Table)
                .if_not_exists()
                .col(ColumnDef::new(Conditions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Conditions::TrackingId).uuid().not_null())
                .col(ColumnDef::new(Conditions::UserId).uuid().not_null())
                .col(ColumnDef::new(Conditions::Kind).string().not_null()) // "less_than", "greater_than", "equal"
                .col(ColumnDef::new(Conditions::Threshold).big_integer())
                .col(ColumnDef::new(Conditions::Active).boolean().not_null().default(true))
                .col(ColumnDef::new(Conditions::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Conditions::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_conditions_tracking_id")
                        .from(Conditions::Table, Conditions::TrackingId)
                        .to(Trackings::Table, Trackings::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_conditions_user_id")
                        .from(Conditions::Table, Conditions::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_conditions_tracking_kind_active")
                .table(Conditions::Table)
                .col(Conditions::TrackingId)
                .col(Conditions::Kind)
                .col(Conditions::Active)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Conditions::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Conditions {
    Table,
    Id,
    TrackingId,
    UserId,
    Kind,
    Threshold,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Trackings {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

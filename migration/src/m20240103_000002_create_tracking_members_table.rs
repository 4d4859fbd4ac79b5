use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TrackingMembers::Table)
                .if_not_exists()
                .col(ColumnDef::new(TrackingMembers::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TrackingMembers::TrackingId).uuid().not_null())
                .col(ColumnDef::new(TrackingMembers::UserId).uuid().not_null())
                .col(ColumnDef::new(TrackingMembers::CreatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_tracking_members_tracking_id")
                        .from(TrackingMembers::Table, TrackingMembers::TrackingId)
                        .to(Trackings::Table, Trackings::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_tracking_members_user_id")
                        .from(TrackingMembers::Table, TrackingMembers::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        // Membership is a set
        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_tracking_members_tracking_user")
                .table(TrackingMembers::Table)
                .col(TrackingMembers::TrackingId)
                .col(TrackingMembers::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TrackingMembers::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum TrackingMembers {
    Table,
    Id,
    TrackingId,
    UserId,
    CreatedAt,
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

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_shops_table;
mod m20240102_000001_create_products_table;
mod m20240102_000002_create_price_snapshots_table;
mod m20240103_000001_create_trackings_table;
mod m20240103_000002_create_tracking_members_table;
mod m20240103_000003_create_conditions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_shops_table::Migration),
            Box::new(m20240102_000001_create_products_table::Migration),
            Box::new(m20240102_000002_create_price_snapshots_table::Migration),
            Box::new(m20240103_000001_create_trackings_table::Migration),
            Box::new(m20240103_000002_create_tracking_members_table::Migration),
            Box::new(m20240103_000003_create_conditions_table::Migration)
        ]
    }
}

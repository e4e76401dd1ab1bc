pub use sea_orm_migration::prelude::*;

mod m20260701_000000_users;
mod m20260701_100000_transactions;
mod m20260715_000000_tags;
mod m20260801_000000_period_summaries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260701_000000_users::Migration),
            Box::new(m20260701_100000_transactions::Migration),
            Box::new(m20260715_000000_tags::Migration),
            Box::new(m20260801_000000_period_summaries::Migration),
        ]
    }
}

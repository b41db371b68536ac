pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_contracts_table;
mod m20250301_000003_create_contract_milestones_table;
mod m20250301_000004_create_contract_time_logs_table;
mod m20250301_000005_create_payments_table;
mod m20250301_000006_create_transactions_table;
mod m20250301_000007_add_payment_uniqueness_indexes;
mod m20250301_000008_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_contracts_table::Migration),
            Box::new(m20250301_000003_create_contract_milestones_table::Migration),
            Box::new(m20250301_000004_create_contract_time_logs_table::Migration),
            Box::new(m20250301_000005_create_payments_table::Migration),
            Box::new(m20250301_000006_create_transactions_table::Migration),
            Box::new(m20250301_000007_add_payment_uniqueness_indexes::Migration),
            Box::new(m20250301_000008_add_lookup_indexes::Migration),
        ]
    }
}

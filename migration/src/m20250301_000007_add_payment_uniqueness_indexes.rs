use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Partial unique indexes backing the ledger's uniqueness invariants:
/// at most one live (not failed, not refunded) escrow payment per milestone,
/// one live release payment per milestone, one live payment per time log.
///
/// Raw SQL because the builder has no WHERE clause for indexes.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX idx_payments_one_escrow_per_milestone \
             ON payments (milestone_id) \
             WHERE is_escrow AND status NOT IN ('failed', 'refunded')",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX idx_payments_one_release_per_milestone \
             ON payments (milestone_id) \
             WHERE NOT is_escrow AND status NOT IN ('failed', 'refunded') \
             AND milestone_id IS NOT NULL",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX idx_payments_one_per_time_log \
             ON payments (time_log_id) \
             WHERE status NOT IN ('failed', 'refunded') AND time_log_id IS NOT NULL",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP INDEX idx_payments_one_per_time_log")
            .await?;
        conn.execute_unprepared("DROP INDEX idx_payments_one_release_per_milestone")
            .await?;
        conn.execute_unprepared("DROP INDEX idx_payments_one_escrow_per_milestone")
            .await?;
        Ok(())
    }
}

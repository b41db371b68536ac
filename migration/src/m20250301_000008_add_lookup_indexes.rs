use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contracts {
    Table,
    ClientId,
    FreelancerId,
}

#[derive(DeriveIden)]
enum ContractMilestones {
    Table,
    ContractId,
}

#[derive(DeriveIden)]
enum ContractTimeLogs {
    Table,
    ContractId,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    ContractId,
    PayerId,
    PayeeId,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    UserId,
    PaymentId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Index on contracts.client_id for fetching contracts by client
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_client_id")
                    .table(Contracts::Table)
                    .col(Contracts::ClientId)
                    .to_owned(),
            )
            .await?;

        // Index on contracts.freelancer_id for fetching contracts by freelancer
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_freelancer_id")
                    .table(Contracts::Table)
                    .col(Contracts::FreelancerId)
                    .to_owned(),
            )
            .await?;

        // Index on contract_milestones.contract_id for ordered milestone listings
        manager
            .create_index(
                Index::create()
                    .name("idx_contract_milestones_contract_id")
                    .table(ContractMilestones::Table)
                    .col(ContractMilestones::ContractId)
                    .to_owned(),
            )
            .await?;

        // Index on contract_time_logs.contract_id for time log listings
        manager
            .create_index(
                Index::create()
                    .name("idx_contract_time_logs_contract_id")
                    .table(ContractTimeLogs::Table)
                    .col(ContractTimeLogs::ContractId)
                    .to_owned(),
            )
            .await?;

        // Indexes on payments for per-contract and per-party listings
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_contract_id")
                    .table(Payments::Table)
                    .col(Payments::ContractId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_payer_id")
                    .table(Payments::Table)
                    .col(Payments::PayerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_payee_id")
                    .table(Payments::Table)
                    .col(Payments::PayeeId)
                    .to_owned(),
            )
            .await?;

        // Indexes on the audit ledger for per-user and per-payment reads
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_user_id")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_payment_id")
                    .table(Transactions::Table)
                    .col(Transactions::PaymentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_contracts_client_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contracts_freelancer_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contract_milestones_contract_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contract_time_logs_contract_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payments_contract_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payments_payer_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payments_payee_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_transactions_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_transactions_payment_id").to_owned())
            .await?;

        Ok(())
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `payments` table and its columns.
///
/// Payments outlive the milestone / time log that originated them, so the
/// reference columns go NULL instead of cascading when the parent is removed.
#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    ContractId,
    MilestoneId,
    TimeLogId,
    PayerId,
    PayeeId,
    CompanyId,
    Amount,
    Currency,
    Status,
    IsEscrow,
    FeeAmount,
    Description,
    InitiatedAt,
    ProcessedAt,
    CompletedAt,
    FailedAt,
    RefundedAt,
    FailureReason,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ContractMilestones {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ContractTimeLogs {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::ContractId).uuid())
                    .col(ColumnDef::new(Payments::MilestoneId).uuid())
                    .col(ColumnDef::new(Payments::TimeLogId).uuid())
                    .col(ColumnDef::new(Payments::PayerId).uuid().not_null())
                    .col(ColumnDef::new(Payments::PayeeId).uuid().not_null())
                    .col(ColumnDef::new(Payments::CompanyId).uuid())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Currency).string().not_null())
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(ColumnDef::new(Payments::IsEscrow).boolean().not_null())
                    .col(ColumnDef::new(Payments::FeeAmount).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Description).text().not_null())
                    .col(
                        ColumnDef::new(Payments::InitiatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::ProcessedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Payments::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Payments::FailedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Payments::RefundedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Payments::FailureReason).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_contract_id")
                            .from(Payments::Table, Payments::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_milestone_id")
                            .from(Payments::Table, Payments::MilestoneId)
                            .to(ContractMilestones::Table, ContractMilestones::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_time_log_id")
                            .from(Payments::Table, Payments::TimeLogId)
                            .to(ContractTimeLogs::Table, ContractTimeLogs::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_payer_id")
                            .from(Payments::Table, Payments::PayerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_payee_id")
                            .from(Payments::Table, Payments::PayeeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

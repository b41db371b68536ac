use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contract_time_logs` table and its columns.
#[derive(DeriveIden)]
enum ContractTimeLogs {
    Table,
    Id,
    ContractId,
    FreelancerId,
    Description,
    StartTime,
    EndTime,
    DurationMinutes,
    IsBillable,
    IsApproved,
    ApprovedById,
    ApprovedAt,
    RejectedAt,
    RejectionReason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contracts {
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
                    .table(ContractTimeLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractTimeLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContractTimeLogs::ContractId).uuid().not_null())
                    .col(
                        ColumnDef::new(ContractTimeLogs::FreelancerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractTimeLogs::Description).text())
                    .col(
                        ColumnDef::new(ContractTimeLogs::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractTimeLogs::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractTimeLogs::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractTimeLogs::IsBillable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ContractTimeLogs::IsApproved).boolean())
                    .col(ColumnDef::new(ContractTimeLogs::ApprovedById).uuid())
                    .col(ColumnDef::new(ContractTimeLogs::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContractTimeLogs::RejectedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContractTimeLogs::RejectionReason).text())
                    .col(
                        ColumnDef::new(ContractTimeLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_time_logs_contract_id")
                            .from(ContractTimeLogs::Table, ContractTimeLogs::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_time_logs_freelancer_id")
                            .from(ContractTimeLogs::Table, ContractTimeLogs::FreelancerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractTimeLogs::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contracts` table and its columns.
#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
    ClientId,
    FreelancerId,
    CompanyId,
    ProjectId,
    ProposalId,
    Title,
    Description,
    Terms,
    ContractType,
    Status,
    TotalAmount,
    Currency,
    HourlyRate,
    WeeklyLimit,
    SignedByClientAt,
    SignedByFreelancerAt,
    StartDate,
    EndDate,
    CompletedAt,
    CancelledAt,
    CancelledBy,
    CancellationReason,
    CreatedAt,
    UpdatedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
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
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contracts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contracts::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Contracts::FreelancerId).uuid().not_null())
                    .col(ColumnDef::new(Contracts::CompanyId).uuid())
                    .col(ColumnDef::new(Contracts::ProjectId).uuid())
                    .col(ColumnDef::new(Contracts::ProposalId).uuid())
                    .col(ColumnDef::new(Contracts::Title).string().not_null())
                    .col(ColumnDef::new(Contracts::Description).text())
                    .col(ColumnDef::new(Contracts::Terms).text())
                    .col(ColumnDef::new(Contracts::ContractType).string().not_null())
                    .col(ColumnDef::new(Contracts::Status).string().not_null())
                    .col(ColumnDef::new(Contracts::TotalAmount).big_integer())
                    .col(ColumnDef::new(Contracts::Currency).string().not_null())
                    .col(ColumnDef::new(Contracts::HourlyRate).big_integer())
                    .col(ColumnDef::new(Contracts::WeeklyLimit).integer())
                    .col(ColumnDef::new(Contracts::SignedByClientAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::SignedByFreelancerAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::EndDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::CancelledAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::CancelledBy).uuid())
                    .col(ColumnDef::new(Contracts::CancellationReason).text())
                    .col(
                        ColumnDef::new(Contracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contracts::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_client_id")
                            .from(Contracts::Table, Contracts::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_freelancer_id")
                            .from(Contracts::Table, Contracts::FreelancerId)
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
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contract_milestones` table and its columns.
#[derive(DeriveIden)]
enum ContractMilestones {
    Table,
    Id,
    ContractId,
    Title,
    Description,
    Amount,
    Currency,
    Status,
    OrderIndex,
    DueDate,
    SubmittedAt,
    ApprovedAt,
    ApprovedById,
    RejectedAt,
    RejectedById,
    RejectionReason,
    AttachmentUrls,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContractMilestones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractMilestones::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContractMilestones::ContractId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractMilestones::Title).string().not_null())
                    .col(ColumnDef::new(ContractMilestones::Description).text())
                    .col(
                        ColumnDef::new(ContractMilestones::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractMilestones::Currency).string().not_null())
                    .col(ColumnDef::new(ContractMilestones::Status).string().not_null())
                    .col(
                        ColumnDef::new(ContractMilestones::OrderIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractMilestones::DueDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContractMilestones::SubmittedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContractMilestones::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContractMilestones::ApprovedById).uuid())
                    .col(ColumnDef::new(ContractMilestones::RejectedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContractMilestones::RejectedById).uuid())
                    .col(ColumnDef::new(ContractMilestones::RejectionReason).text())
                    .col(ColumnDef::new(ContractMilestones::AttachmentUrls).json_binary())
                    .col(
                        ColumnDef::new(ContractMilestones::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractMilestones::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_milestones_contract_id")
                            .from(ContractMilestones::Table, ContractMilestones::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractMilestones::Table).to_owned())
            .await
    }
}

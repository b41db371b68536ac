use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Milestone status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// SeaORM entity for the `contract_milestones` table.
///
/// `order_index` values are kept contiguous (0..n-1) within a contract;
/// deletes re-index the survivors in the same transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_milestones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: Status,
    pub order_index: i32,
    pub due_date: Option<DateTimeUtc>,
    pub submitted_at: Option<DateTimeUtc>,
    pub approved_at: Option<DateTimeUtc>,
    pub approved_by_id: Option<Uuid>,
    pub rejected_at: Option<DateTimeUtc>,
    pub rejected_by_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub attachment_urls: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contract,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMilestone {
    pub title: String,
    pub description: Option<String>,
    pub amount: i64,
    pub due_date: Option<DateTimeUtc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMilestone {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub due_date: Option<DateTimeUtc>,
}

/// Body for `PUT /api/milestones/{id}/status`.
///
/// `rejection_reason` is required when moving to `rejected`;
/// `attachment_urls` is accepted when moving to `submitted`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetMilestoneStatus {
    pub status: Status,
    pub rejection_reason: Option<String>,
    pub attachment_urls: Option<Vec<String>>,
}

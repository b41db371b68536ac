use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::milestones::CreateMilestone;

/// Contract type stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ContractType {
    #[sea_orm(string_value = "fixed")]
    Fixed,
    #[sea_orm(string_value = "hourly")]
    Hourly,
    #[sea_orm(string_value = "retainer")]
    Retainer,
}

/// Contract status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "disputed")]
    Disputed,
}

/// SeaORM entity for the `contracts` table.
///
/// Money fields are integer minor units (cents); `total_amount` on a fixed
/// contract is kept equal to the sum of its milestone amounts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub proposal_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub terms: Option<String>,
    pub contract_type: ContractType,
    pub status: Status,
    pub total_amount: Option<i64>,
    pub currency: String,
    pub hourly_rate: Option<i64>,
    pub weekly_limit: Option<i32>,
    pub signed_by_client_at: Option<DateTimeUtc>,
    pub signed_by_freelancer_at: Option<DateTimeUtc>,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancelled_by: Option<Uuid>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ClientId",
        to = "super::users::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FreelancerId",
        to = "super::users::Column::Id"
    )]
    Freelancer,
    #[sea_orm(has_many = "super::milestones::Entity")]
    Milestones,
    #[sea_orm(has_many = "super::time_logs::Entity")]
    TimeLogs,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl Related<super::time_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeLogs.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True if `user_id` is the client or the freelancer on this contract.
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.freelancer_id == user_id
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContract {
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub proposal_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub terms: Option<String>,
    pub contract_type: ContractType,
    pub total_amount: Option<i64>,
    pub currency: Option<String>,
    pub hourly_rate: Option<i64>,
    pub weekly_limit: Option<i32>,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub milestones: Option<Vec<CreateMilestone>>,
}

/// Patch for `PUT /api/contracts/{id}` — only valid while the contract is
/// a draft. Setting `status` to `pending` finalizes the draft.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateContract {
    pub title: Option<String>,
    pub description: Option<String>,
    pub terms: Option<String>,
    pub total_amount: Option<i64>,
    pub hourly_rate: Option<i64>,
    pub weekly_limit: Option<i32>,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelContract {
    pub reason: Option<String>,
}

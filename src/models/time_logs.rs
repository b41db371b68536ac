use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `contract_time_logs` table.
///
/// `is_approved` is tri-state: NULL = pending review, true = approved,
/// false = rejected.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_time_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Uuid,
    pub freelancer_id: Uuid,
    pub description: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub duration_minutes: i32,
    pub is_billable: bool,
    pub is_approved: Option<bool>,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contract,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FreelancerId",
        to = "super::users::Column::Id"
    )]
    Freelancer,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimeLog {
    pub description: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    /// Defaults to true when omitted.
    pub is_billable: Option<bool>,
}

/// Body for `PUT /api/time-logs/{id}/review`.
/// `reason` is required when `approve` is false.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewTimeLog {
    pub approve: bool,
    pub reason: Option<String>,
}

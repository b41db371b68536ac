use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment status stored as a lowercase string in the database.
///
/// Valid transitions: pending → processing → completed,
/// pending/processing → failed, completed → refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl Status {
    /// A payment in this status still counts against the one-per-milestone /
    /// one-per-time-log uniqueness invariants.
    pub fn is_live(&self) -> bool {
        !matches!(self, Status::Failed | Status::Refunded)
    }
}

/// SeaORM entity for the `payments` table.
///
/// A single directed money movement. Escrow payments (`is_escrow`) hold
/// funds from the client; the matching release is a second, non-escrow
/// payment with the fee already taken out at funding time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Option<Uuid>,
    pub milestone_id: Option<Uuid>,
    pub time_log_id: Option<Uuid>,
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub company_id: Option<Uuid>,
    pub amount: i64,
    pub currency: String,
    pub status: Status,
    pub is_escrow: bool,
    pub fee_amount: i64,
    pub description: String,
    pub initiated_at: DateTimeUtc,
    pub processed_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    pub failed_at: Option<DateTimeUtc>,
    pub refunded_at: Option<DateTimeUtc>,
    pub failure_reason: Option<String>,
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
        belongs_to = "super::milestones::Entity",
        from = "Column::MilestoneId",
        to = "super::milestones::Column::Id"
    )]
    Milestone,
    #[sea_orm(
        belongs_to = "super::time_logs::Entity",
        from = "Column::TimeLogId",
        to = "super::time_logs::Column::Id"
    )]
    TimeLog,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Used internally by the escrow engine to insert a payment row; only the
/// engine constructs these.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub contract_id: Option<Uuid>,
    pub milestone_id: Option<Uuid>,
    pub time_log_id: Option<Uuid>,
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub company_id: Option<Uuid>,
    pub amount: i64,
    pub currency: String,
    pub is_escrow: bool,
    pub fee_amount: i64,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateManualPayment {
    pub contract_id: Uuid,
    pub amount: i64,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundPayment {
    pub reason: String,
}

/// Query filters for `GET /api/payments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilters {
    pub contract_id: Option<Uuid>,
    pub status: Option<Status>,
}

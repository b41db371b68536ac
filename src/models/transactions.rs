use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry type stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TxType {
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "escrow_funding")]
    EscrowFunding,
    #[sea_orm(string_value = "escrow_release")]
    EscrowRelease,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    #[sea_orm(string_value = "fee")]
    Fee,
    #[sea_orm(string_value = "bonus")]
    Bonus,
}

/// SeaORM entity for the `transactions` table.
///
/// Append-only audit trail: one row per side of a money movement, written
/// in the same transaction as the payment state change it records. The db
/// layer exposes no update or delete for this entity.
///
/// `reference_id` is a deterministic idempotency token so a retried
/// settlement callback can recognize work it already did.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_id: Option<Uuid>,
    pub user_id: Uuid,
    pub tx_type: TxType,
    pub amount: i64,
    pub currency: String,
    pub balance_after: Option<i64>,
    pub description: String,
    pub reference_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payment,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

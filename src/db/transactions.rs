use sea_orm::*;
use uuid::Uuid;

use crate::models::transactions::{self, TxType};

/// Append a ledger entry. This module intentionally exposes no update or
/// delete: transactions are immutable once written.
pub async fn insert_transaction<C: ConnectionTrait>(
    conn: &C,
    payment_id: Option<Uuid>,
    user_id: Uuid,
    tx_type: TxType,
    amount: i64,
    currency: &str,
    description: String,
    reference_id: String,
) -> Result<transactions::Model, DbErr> {
    let new_transaction = transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        payment_id: Set(payment_id),
        user_id: Set(user_id),
        tx_type: Set(tx_type),
        amount: Set(amount),
        currency: Set(currency.to_string()),
        balance_after: Set(None),
        description: Set(description),
        reference_id: Set(reference_id),
        created_at: Set(chrono::Utc::now()),
    };

    new_transaction.insert(conn).await
}

/// Ledger entries recorded for a payment, oldest first.
pub async fn get_transactions_by_payment<C: ConnectionTrait>(
    conn: &C,
    payment_id: Uuid,
) -> Result<Vec<transactions::Model>, DbErr> {
    transactions::Entity::find()
        .filter(transactions::Column::PaymentId.eq(payment_id))
        .order_by_asc(transactions::Column::CreatedAt)
        .all(conn)
        .await
}

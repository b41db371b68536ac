use sea_orm::*;
use uuid::Uuid;

use crate::models::payments::{self, NewPayment, PaymentFilters, Status};

/// Insert a new payment in Pending status.
pub async fn insert_payment<C: ConnectionTrait>(
    conn: &C,
    input: NewPayment,
) -> Result<payments::Model, DbErr> {
    let new_payment = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(input.contract_id),
        milestone_id: Set(input.milestone_id),
        time_log_id: Set(input.time_log_id),
        payer_id: Set(input.payer_id),
        payee_id: Set(input.payee_id),
        company_id: Set(input.company_id),
        amount: Set(input.amount),
        currency: Set(input.currency),
        status: Set(Status::Pending),
        is_escrow: Set(input.is_escrow),
        fee_amount: Set(input.fee_amount),
        description: Set(input.description),
        initiated_at: Set(chrono::Utc::now()),
        processed_at: Set(None),
        completed_at: Set(None),
        failed_at: Set(None),
        refunded_at: Set(None),
        failure_reason: Set(None),
    };

    new_payment.insert(conn).await
}

/// Fetch a single payment by ID.
pub async fn get_payment_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<payments::Model>, DbErr> {
    payments::Entity::find_by_id(id).one(conn).await
}

/// The live (not failed, not refunded) escrow payment holding funds for a
/// milestone, if any. Run inside the funding transaction so the check and
/// the insert are one atomic unit.
pub async fn find_live_escrow_for_milestone<C: ConnectionTrait>(
    conn: &C,
    milestone_id: Uuid,
) -> Result<Option<payments::Model>, DbErr> {
    payments::Entity::find()
        .filter(payments::Column::MilestoneId.eq(milestone_id))
        .filter(payments::Column::IsEscrow.eq(true))
        .filter(payments::Column::Status.is_not_in([Status::Failed, Status::Refunded]))
        .one(conn)
        .await
}

/// The live release payment for a milestone, if the escrow was already
/// paid out.
pub async fn find_live_release_for_milestone<C: ConnectionTrait>(
    conn: &C,
    milestone_id: Uuid,
) -> Result<Option<payments::Model>, DbErr> {
    payments::Entity::find()
        .filter(payments::Column::MilestoneId.eq(milestone_id))
        .filter(payments::Column::IsEscrow.eq(false))
        .filter(payments::Column::Status.is_not_in([Status::Failed, Status::Refunded]))
        .one(conn)
        .await
}

/// The live payment referencing a time log, if it was already paid.
pub async fn find_live_for_time_log<C: ConnectionTrait>(
    conn: &C,
    time_log_id: Uuid,
) -> Result<Option<payments::Model>, DbErr> {
    payments::Entity::find()
        .filter(payments::Column::TimeLogId.eq(time_log_id))
        .filter(payments::Column::Status.is_not_in([Status::Failed, Status::Refunded]))
        .one(conn)
        .await
}

/// Completed escrow payments on a contract whose milestone has no live
/// release yet: the funds still held when a contract is cancelled.
pub async fn find_unreleased_escrows_for_contract<C: ConnectionTrait>(
    conn: &C,
    contract_id: Uuid,
) -> Result<Vec<payments::Model>, DbErr> {
    let escrows = payments::Entity::find()
        .filter(payments::Column::ContractId.eq(contract_id))
        .filter(payments::Column::IsEscrow.eq(true))
        .filter(payments::Column::Status.eq(Status::Completed))
        .all(conn)
        .await?;

    let mut unreleased = Vec::new();
    for escrow in escrows {
        let released = match escrow.milestone_id {
            Some(milestone_id) => find_live_release_for_milestone(conn, milestone_id)
                .await?
                .is_some(),
            None => false,
        };
        if !released {
            unreleased.push(escrow);
        }
    }
    Ok(unreleased)
}

/// List payments visible to a user (as payer or payee), newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    filters: &PaymentFilters,
) -> Result<Vec<payments::Model>, DbErr> {
    let mut query = payments::Entity::find().filter(
        Condition::any()
            .add(payments::Column::PayerId.eq(user_id))
            .add(payments::Column::PayeeId.eq(user_id)),
    );

    if let Some(contract_id) = filters.contract_id {
        query = query.filter(payments::Column::ContractId.eq(contract_id));
    }
    if let Some(status) = filters.status {
        query = query.filter(payments::Column::Status.eq(status));
    }

    query
        .order_by_desc(payments::Column::InitiatedAt)
        .all(db)
        .await
}

/// Advance a pending payment to Processing (settlement authorized).
pub async fn mark_processing<C: ConnectionTrait>(
    conn: &C,
    payment: payments::Model,
) -> Result<payments::Model, DbErr> {
    let mut active: payments::ActiveModel = payment.into();
    active.status = Set(Status::Processing);
    active.processed_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

/// Advance a processing payment to Completed (settlement captured).
pub async fn mark_completed<C: ConnectionTrait>(
    conn: &C,
    payment: payments::Model,
) -> Result<payments::Model, DbErr> {
    let mut active: payments::ActiveModel = payment.into();
    active.status = Set(Status::Completed);
    active.completed_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

/// Terminal failure: never leave a payment dangling in Pending.
pub async fn mark_failed<C: ConnectionTrait>(
    conn: &C,
    payment: payments::Model,
    reason: String,
) -> Result<payments::Model, DbErr> {
    let mut active: payments::ActiveModel = payment.into();
    active.status = Set(Status::Failed);
    active.failed_at = Set(Some(chrono::Utc::now()));
    active.failure_reason = Set(Some(reason));
    active.update(conn).await
}

/// Move a completed payment to Refunded.
pub async fn mark_refunded<C: ConnectionTrait>(
    conn: &C,
    payment: payments::Model,
) -> Result<payments::Model, DbErr> {
    let mut active: payments::ActiveModel = payment.into();
    active.status = Set(Status::Refunded);
    active.refunded_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

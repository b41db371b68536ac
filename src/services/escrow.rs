//! Escrow ledger engine: the only place Payment and Transaction rows are
//! created. Every mutating operation here runs as a single database
//! transaction; the uniqueness checks (one live escrow per milestone, one
//! live payment per time log) execute inside that transaction, with the
//! partial unique indexes as the store-level backstop. An uncommitted
//! transaction rolls back on drop, so no error path can leave a partial
//! Payment/Transaction pair behind.

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::db::{contracts as contract_db, milestones as milestone_db, payments as payment_db};
use crate::db::{time_logs as time_log_db, transactions as transaction_db};
use crate::error::AppError;
use crate::models::contracts::{self, ContractType};
use crate::models::milestones::Status as MilestoneStatus;
use crate::models::payments::{self, NewPayment, PaymentFilters, Status as PaymentStatus};
use crate::models::transactions::TxType;
use crate::money;
use crate::notify::{Notifier, kinds};
use crate::services::settlement::SettlementGateway;

/// Outcome of driving a payment through the settlement gateway.
///
/// A failed settlement is still a committed outcome: the payment row is
/// persisted as `failed` with its reason, never left dangling in
/// `pending`.
pub(crate) enum Settled {
    Completed(payments::Model),
    Failed(payments::Model, String),
}

/// Drive a pending payment through authorize → capture, recording each
/// state change on the way.
async fn settle_payment<C: ConnectionTrait>(
    conn: &C,
    gateway: &dyn SettlementGateway,
    payment: payments::Model,
) -> Result<Settled, AppError> {
    if let Err(e) = gateway.authorize(&payment).await {
        let reason = e.to_string();
        let failed = payment_db::mark_failed(conn, payment, reason.clone()).await?;
        return Ok(Settled::Failed(failed, reason));
    }

    let payment = payment_db::mark_processing(conn, payment).await?;

    match gateway.capture(&payment).await {
        Ok(()) => Ok(Settled::Completed(
            payment_db::mark_completed(conn, payment).await?,
        )),
        Err(e) => {
            let reason = e.to_string();
            let failed = payment_db::mark_failed(conn, payment, reason.clone()).await?;
            Ok(Settled::Failed(failed, reason))
        }
    }
}

/// Used on paths where the payment is coupled to another state change
/// (milestone approval, time log approval): a settlement failure must
/// abort the whole transaction, not commit half of it. Standalone
/// operations instead commit the failed payment and surface the error.
pub(crate) fn require_completed(outcome: Settled) -> Result<payments::Model, AppError> {
    match outcome {
        Settled::Completed(payment) => Ok(payment),
        Settled::Failed(_, reason) => Err(AppError::PaymentFailed(reason)),
    }
}

// ── reference_id builders (idempotency tokens for processor retries) ──

fn funding_reference(milestone_id: Uuid) -> String {
    format!("escrow-funding-{milestone_id}")
}

fn release_reference(milestone_id: Uuid) -> String {
    format!("escrow-release-{milestone_id}")
}

fn time_log_reference(time_log_id: Uuid) -> String {
    format!("time-log-payment-{time_log_id}")
}

fn refund_reference(payment_id: Uuid) -> String {
    format!("refund-{payment_id}")
}

// ── funding ──

/// Fund a milestone's escrow. Fails with `AlreadyFunded` if a live escrow
/// payment already holds funds for it. On success the milestone advances
/// from `pending` to `in_progress`.
pub async fn fund_milestone(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    milestone_id: Uuid,
    payer_id: Uuid,
) -> Result<payments::Model, AppError> {
    let txn = db.begin().await?;
    let outcome = fund_milestone_in_txn(&txn, gateway, milestone_id, payer_id).await?;
    txn.commit().await?;

    match outcome {
        Settled::Completed(payment) => {
            notifier.notify(
                payment.payee_id,
                kinds::MILESTONE_FUNDED,
                "A milestone on your contract has been funded",
                payment
                    .contract_id
                    .map(|contract_id| format!("/contracts/{contract_id}")),
                serde_json::json!({ "milestone_id": milestone_id, "payment_id": payment.id }),
            );
            Ok(payment)
        }
        Settled::Failed(_, reason) => Err(AppError::PaymentFailed(reason)),
    }
}

pub(crate) async fn fund_milestone_in_txn<C: ConnectionTrait>(
    conn: &C,
    gateway: &dyn SettlementGateway,
    milestone_id: Uuid,
    payer_id: Uuid,
) -> Result<Settled, AppError> {
    let milestone = milestone_db::get_milestone_by_id(conn, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;

    let contract = contract_db::get_contract_by_id(conn, milestone.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for milestone not found".to_string()))?;

    if contract.client_id != payer_id {
        return Err(AppError::Forbidden(
            "Only the contract's client can fund a milestone".to_string(),
        ));
    }
    if contract.status != contracts::Status::Active {
        return Err(AppError::InvalidState(
            "Milestones can only be funded on an active contract".to_string(),
        ));
    }

    if payment_db::find_live_escrow_for_milestone(conn, milestone_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyFunded(format!(
            "Milestone {milestone_id} already has a funded escrow"
        )));
    }

    let fee_amount = money::platform_fee(milestone.amount);
    let payment = payment_db::insert_payment(
        conn,
        NewPayment {
            contract_id: Some(contract.id),
            milestone_id: Some(milestone.id),
            time_log_id: None,
            payer_id: contract.client_id,
            payee_id: contract.freelancer_id,
            company_id: contract.company_id,
            amount: milestone.amount,
            currency: milestone.currency.clone(),
            is_escrow: true,
            fee_amount,
            description: format!("Escrow funding for milestone \"{}\"", milestone.title),
        },
    )
    .await?;

    transaction_db::insert_transaction(
        conn,
        Some(payment.id),
        contract.client_id,
        TxType::EscrowFunding,
        milestone.amount,
        &milestone.currency,
        format!("Escrow funding for milestone \"{}\"", milestone.title),
        funding_reference(milestone.id),
    )
    .await?;

    let outcome = settle_payment(conn, gateway, payment).await?;

    // Funds are held: pull the milestone into in_progress if work had not
    // started yet. A failed settlement leaves it untouched.
    if let Settled::Completed(_) = outcome {
        if milestone.status == MilestoneStatus::Pending {
            milestone_db::mark_in_progress(conn, milestone).await?;
        }
    }

    Ok(outcome)
}

// ── release ──

/// Release a milestone's escrowed funds to the freelancer. Requires a
/// completed escrow payment (`NoFundedEscrow` otherwise); the release
/// carries no fee since the platform cut was taken at funding time.
pub async fn release_milestone_payment(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    milestone_id: Uuid,
    released_by: Uuid,
) -> Result<payments::Model, AppError> {
    let txn = db.begin().await?;
    let outcome = release_milestone_in_txn(&txn, gateway, milestone_id, released_by).await?;
    txn.commit().await?;

    match outcome {
        Settled::Completed(payment) => {
            notifier.notify(
                payment.payee_id,
                kinds::PAYMENT_RELEASED,
                "Escrowed funds for your milestone have been released",
                Some(format!("/payments/{}", payment.id)),
                serde_json::json!({ "milestone_id": milestone_id, "amount": payment.amount }),
            );
            Ok(payment)
        }
        Settled::Failed(_, reason) => Err(AppError::PaymentFailed(reason)),
    }
}

pub(crate) async fn release_milestone_in_txn<C: ConnectionTrait>(
    conn: &C,
    gateway: &dyn SettlementGateway,
    milestone_id: Uuid,
    released_by: Uuid,
) -> Result<Settled, AppError> {
    let milestone = milestone_db::get_milestone_by_id(conn, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;

    let contract = contract_db::get_contract_by_id(conn, milestone.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for milestone not found".to_string()))?;

    if contract.client_id != released_by {
        return Err(AppError::Forbidden(
            "Only the contract's client can release a milestone payment".to_string(),
        ));
    }

    let escrow = payment_db::find_live_escrow_for_milestone(conn, milestone_id)
        .await?
        .filter(|p| p.status == PaymentStatus::Completed)
        .ok_or_else(|| {
            AppError::NoFundedEscrow(format!(
                "Milestone {milestone_id} has no funded escrow to release"
            ))
        })?;

    if payment_db::find_live_release_for_milestone(conn, milestone_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyPaid(format!(
            "Milestone {milestone_id} payment was already released"
        )));
    }

    // Fee was deducted when the escrow was funded; the release moves the
    // full amount with no second charge.
    let payment = payment_db::insert_payment(
        conn,
        NewPayment {
            contract_id: Some(contract.id),
            milestone_id: Some(milestone.id),
            time_log_id: None,
            payer_id: contract.client_id,
            payee_id: contract.freelancer_id,
            company_id: contract.company_id,
            amount: escrow.amount,
            currency: escrow.currency.clone(),
            is_escrow: false,
            fee_amount: 0,
            description: format!("Escrow release for milestone \"{}\"", milestone.title),
        },
    )
    .await?;

    transaction_db::insert_transaction(
        conn,
        Some(payment.id),
        contract.freelancer_id,
        TxType::EscrowRelease,
        escrow.amount,
        &escrow.currency,
        format!("Escrow release for milestone \"{}\"", milestone.title),
        release_reference(milestone.id),
    )
    .await?;

    settle_payment(conn, gateway, payment).await
}

// ── time log payment ──

/// Pay a billable time log. Fails with `AlreadyPaid` if a live payment
/// already references the entry.
pub async fn pay_time_log(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    time_log_id: Uuid,
    payer_id: Uuid,
) -> Result<payments::Model, AppError> {
    let txn = db.begin().await?;
    let outcome = pay_time_log_in_txn(&txn, gateway, time_log_id, payer_id).await?;
    txn.commit().await?;

    match outcome {
        Settled::Completed(payment) => {
            notifier.notify(
                payment.payee_id,
                kinds::PAYMENT_RECEIVED,
                "Your logged hours have been paid",
                Some(format!("/payments/{}", payment.id)),
                serde_json::json!({ "time_log_id": time_log_id, "amount": payment.amount }),
            );
            Ok(payment)
        }
        Settled::Failed(_, reason) => Err(AppError::PaymentFailed(reason)),
    }
}

pub(crate) async fn pay_time_log_in_txn<C: ConnectionTrait>(
    conn: &C,
    gateway: &dyn SettlementGateway,
    time_log_id: Uuid,
    payer_id: Uuid,
) -> Result<Settled, AppError> {
    let time_log = time_log_db::get_time_log_by_id(conn, time_log_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Time log {time_log_id} not found")))?;

    let contract = contract_db::get_contract_by_id(conn, time_log.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for time log not found".to_string()))?;

    if contract.client_id != payer_id {
        return Err(AppError::Forbidden(
            "Only the contract's client can pay a time log".to_string(),
        ));
    }
    if contract.status != contracts::Status::Active {
        return Err(AppError::InvalidState(
            "Time logs can only be paid on an active contract".to_string(),
        ));
    }
    if contract.contract_type != ContractType::Hourly {
        return Err(AppError::InvalidState(
            "Time logs are only billable on hourly contracts".to_string(),
        ));
    }
    if !time_log.is_billable {
        return Err(AppError::BadRequest(
            "This time log is not billable".to_string(),
        ));
    }

    if payment_db::find_live_for_time_log(conn, time_log_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyPaid(format!(
            "Time log {time_log_id} was already paid"
        )));
    }

    let hourly_rate = contract.hourly_rate.ok_or_else(|| {
        AppError::BadRequest("Contract has no hourly rate configured".to_string())
    })?;
    let amount = money::billable_amount(hourly_rate, time_log.duration_minutes);
    let fee_amount = money::platform_fee(amount);

    let payment = payment_db::insert_payment(
        conn,
        NewPayment {
            contract_id: Some(contract.id),
            milestone_id: None,
            time_log_id: Some(time_log.id),
            payer_id: contract.client_id,
            payee_id: contract.freelancer_id,
            company_id: contract.company_id,
            amount,
            currency: contract.currency.clone(),
            is_escrow: false,
            fee_amount,
            description: format!(
                "Payment for {} logged minutes on \"{}\"",
                time_log.duration_minutes, contract.title
            ),
        },
    )
    .await?;

    transaction_db::insert_transaction(
        conn,
        Some(payment.id),
        contract.client_id,
        TxType::Payment,
        amount,
        &contract.currency,
        format!("Payment for time logged on \"{}\"", contract.title),
        time_log_reference(time_log.id),
    )
    .await?;

    settle_payment(conn, gateway, payment).await
}

// ── manual payment ──

/// One-off direct payment on an active contract, outside the milestone /
/// time log flows. Same fee treatment as a direct payment.
pub async fn create_manual_payment(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    contract_id: Uuid,
    amount: i64,
    description: String,
    payer_id: Uuid,
) -> Result<payments::Model, AppError> {
    if amount <= 0 {
        return Err(AppError::BadRequest(
            "Payment amount must be positive".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let contract = contract_db::get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.client_id != payer_id {
        return Err(AppError::Forbidden(
            "Only the contract's client can send a payment".to_string(),
        ));
    }
    if contract.status != contracts::Status::Active {
        return Err(AppError::InvalidState(
            "Payments can only be sent on an active contract".to_string(),
        ));
    }

    let fee_amount = money::platform_fee(amount);
    let payment = payment_db::insert_payment(
        &txn,
        NewPayment {
            contract_id: Some(contract.id),
            milestone_id: None,
            time_log_id: None,
            payer_id: contract.client_id,
            payee_id: contract.freelancer_id,
            company_id: contract.company_id,
            amount,
            currency: contract.currency.clone(),
            is_escrow: false,
            fee_amount,
            description: description.clone(),
        },
    )
    .await?;

    transaction_db::insert_transaction(
        &txn,
        Some(payment.id),
        contract.client_id,
        TxType::Payment,
        amount,
        &contract.currency,
        description,
        format!("manual-payment-{}", payment.id),
    )
    .await?;

    let outcome = settle_payment(&txn, gateway, payment).await?;
    txn.commit().await?;

    match outcome {
        Settled::Completed(payment) => {
            notifier.notify(
                payment.payee_id,
                kinds::PAYMENT_RECEIVED,
                "You received a payment",
                Some(format!("/payments/{}", payment.id)),
                serde_json::json!({ "contract_id": contract_id, "amount": payment.amount }),
            );
            Ok(payment)
        }
        Settled::Failed(_, reason) => Err(AppError::PaymentFailed(reason)),
    }
}

// ── refund ──

/// Refund a completed, non-escrow payment back to the payer. Escrowed
/// funds are unwound through contract cancellation, never refunded
/// directly.
pub async fn refund_payment(
    db: &DatabaseConnection,
    notifier: &Notifier,
    payment_id: Uuid,
    requester_id: Uuid,
    reason: String,
) -> Result<payments::Model, AppError> {
    let txn = db.begin().await?;

    let payment = payment_db::get_payment_by_id(&txn, payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {payment_id} not found")))?;

    if payment.payer_id != requester_id {
        return Err(AppError::Forbidden(
            "Only the original payer can request a refund".to_string(),
        ));
    }
    if payment.status != PaymentStatus::Completed {
        return Err(AppError::InvalidState(
            "Only completed payments can be refunded".to_string(),
        ));
    }
    if payment.is_escrow {
        return Err(AppError::InvalidState(
            "Escrow payments cannot be refunded directly; cancel the contract instead".to_string(),
        ));
    }

    let payment = refund_in_txn(&txn, payment, reason).await?;
    txn.commit().await?;

    notifier.notify(
        payment.payee_id,
        kinds::PAYMENT_REFUNDED,
        "A payment you received has been refunded",
        Some(format!("/payments/{}", payment.id)),
        serde_json::json!({ "payment_id": payment.id, "amount": payment.amount }),
    );

    Ok(payment)
}

/// Shared refund leg: ledger entry + status flip. Also used by contract
/// cancellation to unwind held escrow.
pub(crate) async fn refund_in_txn<C: ConnectionTrait>(
    conn: &C,
    payment: payments::Model,
    reason: String,
) -> Result<payments::Model, AppError> {
    transaction_db::insert_transaction(
        conn,
        Some(payment.id),
        payment.payer_id,
        TxType::Refund,
        payment.amount,
        &payment.currency,
        reason,
        refund_reference(payment.id),
    )
    .await?;

    Ok(payment_db::mark_refunded(conn, payment).await?)
}

// ── reads ──

/// Fetch a payment; only the payer or the payee may view it.
pub async fn get_payment(
    db: &DatabaseConnection,
    payment_id: Uuid,
    user_id: Uuid,
) -> Result<payments::Model, AppError> {
    let payment = payment_db::get_payment_by_id(db, payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {payment_id} not found")))?;

    if payment.payer_id != user_id && payment.payee_id != user_id {
        return Err(AppError::Forbidden(
            "You can only view payments you are involved in".to_string(),
        ));
    }

    Ok(payment)
}

/// List payments where the user is payer or payee.
pub async fn list_payments(
    db: &DatabaseConnection,
    user_id: Uuid,
    filters: &PaymentFilters,
) -> Result<Vec<payments::Model>, AppError> {
    Ok(payment_db::list_for_user(db, user_id, filters).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payments::Status;

    #[test]
    fn failed_and_refunded_payments_are_not_live() {
        assert!(Status::Pending.is_live());
        assert!(Status::Processing.is_live());
        assert!(Status::Completed.is_live());
        assert!(!Status::Failed.is_live());
        assert!(!Status::Refunded.is_live());
    }

    #[test]
    fn reference_ids_are_deterministic_per_source() {
        let id = Uuid::new_v4();
        assert_eq!(funding_reference(id), funding_reference(id));
        assert_ne!(funding_reference(id), release_reference(id));
        assert_ne!(release_reference(id), time_log_reference(id));
    }

    #[test]
    fn fee_is_charged_once_across_fund_and_release() {
        // Funding a 100_000-cent milestone takes the 5% fee; the release
        // leg adds nothing, so the total cut stays exactly 5%.
        let milestone_amount = 100_000;
        let funding_fee = money::platform_fee_bps(milestone_amount, money::DEFAULT_FEE_BPS);
        let release_fee = 0;
        assert_eq!(funding_fee + release_fee, 5_000);
    }
}

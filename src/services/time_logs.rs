//! Time log workflow engine for hourly contracts: freelancer-reported
//! work intervals, client review, and the pay-once-on-approval rule.

use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::db::{contracts as contract_db, time_logs as time_log_db};
use crate::error::AppError;
use crate::models::contracts::{ContractType, Status as ContractStatus};
use crate::models::time_logs::{self, CreateTimeLog, ReviewTimeLog};
use crate::money;
use crate::notify::{Notifier, kinds};
use crate::services::escrow;
use crate::services::settlement::SettlementGateway;

/// Record a work interval on an active hourly contract. Duration is
/// computed here, rounded to the nearest minute.
pub async fn create_time_log(
    db: &DatabaseConnection,
    notifier: &Notifier,
    contract_id: Uuid,
    input: CreateTimeLog,
    user_id: Uuid,
) -> Result<time_logs::Model, AppError> {
    if input.end_time <= input.start_time {
        return Err(AppError::BadRequest(
            "Time log end must be after its start".to_string(),
        ));
    }

    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.freelancer_id != user_id {
        return Err(AppError::Forbidden(
            "Only the contract's freelancer can log time".to_string(),
        ));
    }
    if contract.status != ContractStatus::Active {
        return Err(AppError::InvalidState(
            "Time can only be logged on an active contract".to_string(),
        ));
    }
    if contract.contract_type != ContractType::Hourly {
        return Err(AppError::InvalidState(
            "Time logs are only valid on hourly contracts".to_string(),
        ));
    }

    let duration = money::duration_minutes(input.start_time, input.end_time);
    let time_log =
        time_log_db::insert_time_log(db, contract.id, user_id, duration, &input).await?;

    notifier.notify(
        contract.client_id,
        kinds::TIME_LOG_CREATED,
        "New hours were logged on your contract",
        Some(format!("/contracts/{}", contract.id)),
        serde_json::json!({
            "time_log_id": time_log.id,
            "duration_minutes": time_log.duration_minutes,
        }),
    );

    Ok(time_log)
}

/// Client review of a time log. Approving a billable entry pays it in the
/// same transaction; the engine's uniqueness check makes re-approval fail
/// with `AlreadyPaid` instead of paying twice. Rejection needs a reason.
pub async fn review_time_log(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    time_log_id: Uuid,
    review: ReviewTimeLog,
    user_id: Uuid,
) -> Result<time_logs::Model, AppError> {
    if !review.approve
        && review
            .reason
            .as_deref()
            .map(str::trim)
            .is_none_or(str::is_empty)
    {
        return Err(AppError::BadRequest(
            "A rejection reason is required".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let time_log = time_log_db::get_time_log_by_id(&txn, time_log_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Time log {time_log_id} not found")))?;

    let contract = contract_db::get_contract_by_id(&txn, time_log.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for time log not found".to_string()))?;

    if contract.client_id != user_id {
        return Err(AppError::Forbidden(
            "Only the client can review time logs".to_string(),
        ));
    }
    if contract.status != ContractStatus::Active {
        return Err(AppError::InvalidState(
            "Time logs can only be reviewed on an active contract".to_string(),
        ));
    }
    if time_log.is_approved.is_some() {
        return Err(AppError::InvalidState(
            "This time log has already been reviewed".to_string(),
        ));
    }

    let time_log = if review.approve {
        let billable = time_log.is_billable;
        let time_log = time_log_db::mark_approved(&txn, time_log, user_id).await?;
        if billable {
            // Approval and payment are one unit; the engine's
            // in-transaction check rules out a second payment.
            escrow::require_completed(
                escrow::pay_time_log_in_txn(&txn, gateway, time_log.id, user_id).await?,
            )?;
        }
        time_log
    } else {
        let reason = review.reason.clone().unwrap_or_default();
        time_log_db::mark_rejected(&txn, time_log, reason).await?
    };

    txn.commit().await?;

    notifier.notify(
        time_log.freelancer_id,
        kinds::TIME_LOG_REVIEWED,
        if review.approve {
            "Your logged hours were approved"
        } else {
            "Your logged hours were rejected"
        },
        Some(format!("/contracts/{}", time_log.contract_id)),
        serde_json::json!({
            "time_log_id": time_log.id,
            "approved": review.approve,
        }),
    );

    Ok(time_log)
}

/// Time logs of a contract visible to the caller, newest first.
pub async fn list_time_logs(
    db: &DatabaseConnection,
    contract_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<time_logs::Model>, AppError> {
    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if !contract.is_party(user_id) {
        return Err(AppError::Forbidden(
            "You can only view time logs on your own contracts".to_string(),
        ));
    }

    Ok(time_log_db::get_time_logs_by_contract(db, contract_id).await?)
}

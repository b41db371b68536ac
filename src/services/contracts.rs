//! Contract lifecycle manager: draft → pending → active →
//! {completed | cancelled | disputed}, with the two-party signature
//! protocol and the activation-time escrow side effects.

use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::db::{contracts as contract_db, milestones as milestone_db, payments as payment_db};
use crate::error::AppError;
use crate::models::contracts::{self, ContractType, CreateContract, Status, UpdateContract};
use crate::models::milestones::{self, CreateMilestone};
use crate::models::payments;
use crate::notify::{Notifier, kinds};
use crate::services::escrow;
use crate::services::settlement::SettlementGateway;

/// Create a contract in Draft. Supplied milestones are created with
/// contiguous order indices; a fixed contract with only a total gets a
/// single auto-created milestone so the escrow flow always has one to
/// fund.
pub async fn create_contract(
    db: &DatabaseConnection,
    notifier: &Notifier,
    input: CreateContract,
    creator_id: Uuid,
) -> Result<contracts::Model, AppError> {
    if input.client_id != creator_id {
        return Err(AppError::Forbidden(
            "Contracts can only be created by their client".to_string(),
        ));
    }
    if input.client_id == input.freelancer_id {
        return Err(AppError::BadRequest(
            "You cannot create a contract with yourself".to_string(),
        ));
    }
    if input.milestones.is_some() && input.contract_type != ContractType::Fixed {
        return Err(AppError::BadRequest(
            "Milestones are only valid on fixed-price contracts".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let mut contract = contract_db::insert_contract(&txn, &input).await?;

    let new_milestones: Vec<CreateMilestone> = match input.milestones {
        Some(list) if !list.is_empty() => list,
        _ => match (input.contract_type, input.total_amount) {
            (ContractType::Fixed, Some(total)) => vec![CreateMilestone {
                title: format!("Full payment: {}", contract.title),
                description: None,
                amount: total,
                due_date: contract.end_date,
            }],
            _ => Vec::new(),
        },
    };

    if !new_milestones.is_empty() {
        let mut total = 0;
        for (order_index, milestone) in new_milestones.iter().enumerate() {
            if milestone.amount <= 0 {
                return Err(AppError::BadRequest(
                    "Milestone amounts must be positive".to_string(),
                ));
            }
            total += milestone.amount;
            milestone_db::insert_milestone(
                &txn,
                contract.id,
                &contract.currency,
                order_index as i32,
                milestone,
            )
            .await?;
        }
        contract = contract_db::set_total_amount(&txn, contract, total).await?;
    }

    txn.commit().await?;

    notifier.notify(
        contract.freelancer_id,
        kinds::CONTRACT_CREATED,
        "You have a new contract offer",
        Some(format!("/contracts/{}", contract.id)),
        serde_json::json!({ "contract_id": contract.id }),
    );

    Ok(contract)
}

/// Update a draft. Only the client may edit, and only while the contract
/// is still a draft; setting `status: pending` finalizes it for review.
pub async fn update_contract(
    db: &DatabaseConnection,
    notifier: &Notifier,
    contract_id: Uuid,
    patch: UpdateContract,
    user_id: Uuid,
) -> Result<contracts::Model, AppError> {
    if let Some(status) = patch.status {
        if status != Status::Pending {
            return Err(AppError::BadRequest(
                "A draft can only be moved to pending from here".to_string(),
            ));
        }
    }
    let finalized = patch.status == Some(Status::Pending);

    let txn = db.begin().await?;

    let contract = contract_db::get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.client_id != user_id {
        return Err(AppError::Forbidden(
            "Only the client can update a contract".to_string(),
        ));
    }
    if contract.status != Status::Draft {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; only drafts can be updated",
            contract.status
        )));
    }

    let mut contract = contract_db::apply_patch(&txn, contract, &patch).await?;

    // A fixed contract with milestones keeps total_amount equal to the
    // milestone sum, whatever the patch said.
    if contract.contract_type == ContractType::Fixed {
        let milestones = milestone_db::get_milestones_by_contract(&txn, contract.id).await?;
        if !milestones.is_empty() {
            let total = milestones.iter().map(|m| m.amount).sum();
            contract = contract_db::set_total_amount(&txn, contract, total).await?;
        }
    }

    if finalized {
        contract = contract_db::mark_pending(&txn, contract).await?;
    }

    txn.commit().await?;

    if finalized {
        notifier.notify(
            contract.freelancer_id,
            kinds::CONTRACT_PENDING,
            "A contract is ready for your review",
            Some(format!("/contracts/{}", contract.id)),
            serde_json::json!({ "contract_id": contract.id }),
        );
    }

    Ok(contract)
}

/// Record a party's signature on a pending contract. When the second
/// signature lands the contract activates, and for fixed contracts the
/// first milestone is funded best-effort: a funding failure is logged
/// and leaves the milestone unfunded for a manual retry, never undoing
/// the activation.
pub async fn sign_contract(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    contract_id: Uuid,
    user_id: Uuid,
) -> Result<contracts::Model, AppError> {
    let txn = db.begin().await?;

    let contract = contract_db::get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if !contract.is_party(user_id) {
        return Err(AppError::Forbidden(
            "Only the client or the freelancer can sign this contract".to_string(),
        ));
    }
    if contract.status != Status::Pending {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; only pending contracts can be signed",
            contract.status
        )));
    }

    let signer_is_client = contract.client_id == user_id;
    let already_signed = if signer_is_client {
        contract.signed_by_client_at.is_some()
    } else {
        contract.signed_by_freelancer_at.is_some()
    };
    if already_signed {
        return Err(AppError::InvalidState(
            "You have already signed this contract".to_string(),
        ));
    }

    let mut contract = contract_db::record_signature(&txn, contract, signer_is_client).await?;

    if contract.signed_by_client_at.is_some() && contract.signed_by_freelancer_at.is_some() {
        contract = contract_db::activate(&txn, contract).await?;
    }

    txn.commit().await?;

    let counterparty = if signer_is_client {
        contract.freelancer_id
    } else {
        contract.client_id
    };

    if contract.status == Status::Active {
        tracing::info!(contract_id = %contract.id, "contract activated");
        notifier.notify(
            counterparty,
            kinds::CONTRACT_ACTIVATED,
            "Your contract is now active",
            Some(format!("/contracts/{}", contract.id)),
            serde_json::json!({ "contract_id": contract.id }),
        );

        if contract.contract_type == ContractType::Fixed {
            fund_first_milestone(db, gateway, notifier, &contract).await;
        }
    } else {
        notifier.notify(
            counterparty,
            kinds::CONTRACT_SIGNED,
            "The other party has signed your contract",
            Some(format!("/contracts/{}", contract.id)),
            serde_json::json!({ "contract_id": contract.id }),
        );
    }

    Ok(contract)
}

/// Kick off escrow for the first milestone of a freshly activated fixed
/// contract. Runs after the activation has committed.
async fn fund_first_milestone(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    contract: &contracts::Model,
) {
    let first = match milestone_db::get_milestones_by_contract(db, contract.id).await {
        Ok(milestones) => milestones.into_iter().next(),
        Err(e) => {
            tracing::warn!(contract_id = %contract.id, "could not load milestones for funding: {e}");
            return;
        }
    };

    let Some(first) = first else {
        return;
    };

    match escrow::fund_milestone(db, gateway, notifier, first.id, contract.client_id).await {
        Ok(payment) => {
            tracing::info!(
                contract_id = %contract.id,
                milestone_id = %first.id,
                payment_id = %payment.id,
                "funded first milestone on activation"
            );
        }
        Err(e) => {
            tracing::warn!(
                contract_id = %contract.id,
                milestone_id = %first.id,
                "first milestone left unfunded: {e}"
            );
        }
    }
}

/// Cancel a contract from any non-terminal state. Completed escrow
/// payments whose milestone was never released are refunded to the client
/// in the same transaction, so cancellation never strands held funds.
pub async fn cancel_contract(
    db: &DatabaseConnection,
    notifier: &Notifier,
    contract_id: Uuid,
    user_id: Uuid,
    reason: Option<String>,
) -> Result<contracts::Model, AppError> {
    let txn = db.begin().await?;

    let contract = contract_db::get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if !contract.is_party(user_id) {
        return Err(AppError::Forbidden(
            "Only the client or the freelancer can cancel this contract".to_string(),
        ));
    }
    if !can_cancel(contract.status) {
        return Err(AppError::InvalidState(format!(
            "Contract is already {:?}",
            contract.status
        )));
    }

    let held = payment_db::find_unreleased_escrows_for_contract(&txn, contract.id).await?;
    let mut refunded: Vec<payments::Model> = Vec::with_capacity(held.len());
    for escrow_payment in held {
        let payment = escrow::refund_in_txn(
            &txn,
            escrow_payment,
            "Escrow refund on contract cancellation".to_string(),
        )
        .await?;
        refunded.push(payment);
    }

    let contract = contract_db::cancel(&txn, contract, user_id, reason).await?;

    txn.commit().await?;

    let counterparty = if contract.client_id == user_id {
        contract.freelancer_id
    } else {
        contract.client_id
    };
    notifier.notify(
        counterparty,
        kinds::CONTRACT_CANCELLED,
        "Your contract has been cancelled",
        Some(format!("/contracts/{}", contract.id)),
        serde_json::json!({
            "contract_id": contract.id,
            "reason": contract.cancellation_reason,
        }),
    );
    for payment in &refunded {
        notifier.notify(
            payment.payer_id,
            kinds::PAYMENT_REFUNDED,
            "Held escrow funds were returned to you",
            Some(format!("/payments/{}", payment.id)),
            serde_json::json!({ "payment_id": payment.id, "amount": payment.amount }),
        );
    }

    Ok(contract)
}

/// Complete an active contract. For fixed contracts every milestone must
/// already be approved; the error names the ones that are not.
pub async fn complete_contract(
    db: &DatabaseConnection,
    notifier: &Notifier,
    contract_id: Uuid,
    user_id: Uuid,
) -> Result<contracts::Model, AppError> {
    let txn = db.begin().await?;

    let contract = contract_db::get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.client_id != user_id {
        return Err(AppError::Forbidden(
            "Only the client can complete a contract".to_string(),
        ));
    }
    if contract.status != Status::Active {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; only active contracts can be completed",
            contract.status
        )));
    }

    if contract.contract_type == ContractType::Fixed {
        let milestones = milestone_db::get_milestones_by_contract(&txn, contract.id).await?;
        let blockers = completion_blockers(&milestones);
        if !blockers.is_empty() {
            return Err(AppError::InvalidState(format!(
                "Milestones not yet approved: {}",
                blockers.join(", ")
            )));
        }
    }

    let contract = contract_db::complete(&txn, contract).await?;
    txn.commit().await?;

    notifier.notify(
        contract.freelancer_id,
        kinds::CONTRACT_COMPLETED,
        "Your contract has been marked completed",
        Some(format!("/contracts/{}", contract.id)),
        serde_json::json!({ "contract_id": contract.id }),
    );

    Ok(contract)
}

/// Fetch a contract visible to the caller.
pub async fn get_contract(
    db: &DatabaseConnection,
    contract_id: Uuid,
    user_id: Uuid,
) -> Result<contracts::Model, AppError> {
    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if !contract.is_party(user_id) {
        return Err(AppError::Forbidden(
            "You can only view contracts you are involved in".to_string(),
        ));
    }

    Ok(contract)
}

/// Contracts where the caller is a party, newest first.
pub async fn list_contracts(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<contracts::Model>, AppError> {
    Ok(contract_db::get_contracts_for_user(db, user_id).await?)
}

/// Cancellation is allowed from every state except the two financial
/// terminals. Disputed contracts can still be cancelled, which is also
/// what unwinds their held escrow.
fn can_cancel(status: Status) -> bool {
    !matches!(status, Status::Completed | Status::Cancelled)
}

/// Titles of milestones blocking completion (everything not approved).
fn completion_blockers(milestones: &[milestones::Model]) -> Vec<String> {
    milestones
        .iter()
        .filter(|m| m.status != milestones::Status::Approved)
        .map(|m| m.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::milestones::Status as MilestoneStatus;

    fn milestone(title: &str, status: MilestoneStatus) -> milestones::Model {
        milestones::Model {
            id: Uuid::new_v4(),
            contract_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            amount: 10_000,
            currency: "USD".to_string(),
            status,
            order_index: 0,
            due_date: None,
            submitted_at: None,
            approved_at: None,
            approved_by_id: None,
            rejected_at: None,
            rejected_by_id: None,
            rejection_reason: None,
            attachment_urls: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn terminal_states_cannot_be_cancelled() {
        assert!(can_cancel(Status::Draft));
        assert!(can_cancel(Status::Pending));
        assert!(can_cancel(Status::Active));
        assert!(can_cancel(Status::Disputed));
        assert!(!can_cancel(Status::Completed));
        assert!(!can_cancel(Status::Cancelled));
    }

    #[test]
    fn unapproved_milestones_block_completion() {
        let milestones = vec![
            milestone("Design", MilestoneStatus::Approved),
            milestone("Build", MilestoneStatus::Submitted),
            milestone("Ship", MilestoneStatus::Pending),
        ];
        assert_eq!(completion_blockers(&milestones), vec!["Build", "Ship"]);
    }

    #[test]
    fn fully_approved_contract_has_no_blockers() {
        let milestones = vec![
            milestone("Design", MilestoneStatus::Approved),
            milestone("Build", MilestoneStatus::Approved),
        ];
        assert!(completion_blockers(&milestones).is_empty());
    }
}

//! Milestone workflow engine for fixed-price contracts: ordered
//! deliverables, the client/freelancer transition protocol, and the
//! funding/release side effects that ride on those transitions.

use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::db::{contracts as contract_db, milestones as milestone_db};
use crate::error::AppError;
use crate::models::contracts::{self, ContractType, Status as ContractStatus};
use crate::models::milestones::{
    self, CreateMilestone, SetMilestoneStatus, Status, UpdateMilestone,
};
use crate::notify::{Notifier, kinds};
use crate::services::escrow;
use crate::services::settlement::SettlementGateway;

/// Which side of the contract the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Party {
    Client,
    Freelancer,
}

fn party_of(contract: &contracts::Model, user_id: Uuid) -> Result<Party, AppError> {
    if contract.client_id == user_id {
        Ok(Party::Client)
    } else if contract.freelancer_id == user_id {
        Ok(Party::Freelancer)
    } else {
        Err(AppError::Forbidden(
            "You are not a party to this contract".to_string(),
        ))
    }
}

/// The transition matrix: which status moves exist, and who may make them.
///
/// An undefined (from, to) pair is a BadRequest; a defined pair attempted
/// by the wrong side is Forbidden. Rejected → in_progress is the
/// freelancer's re-submission path.
pub(crate) fn validate_transition(
    current: Status,
    requested: Status,
    party: Party,
) -> Result<(), AppError> {
    match (current, requested) {
        (Status::Pending, Status::InProgress) => Ok(()),
        (Status::Rejected, Status::InProgress) => match party {
            Party::Freelancer => Ok(()),
            Party::Client => Err(AppError::Forbidden(
                "Only the freelancer can restart a rejected milestone".to_string(),
            )),
        },
        (Status::Pending | Status::InProgress, Status::Submitted) => match party {
            Party::Freelancer => Ok(()),
            Party::Client => Err(AppError::Forbidden(
                "Only the freelancer can submit a milestone".to_string(),
            )),
        },
        (Status::Submitted, Status::Approved) => match party {
            Party::Client => Ok(()),
            Party::Freelancer => Err(AppError::Forbidden(
                "Only the client can approve a milestone".to_string(),
            )),
        },
        (Status::Submitted, Status::Rejected) => match party {
            Party::Client => Ok(()),
            Party::Freelancer => Err(AppError::Forbidden(
                "Only the client can reject a milestone".to_string(),
            )),
        },
        _ => Err(AppError::BadRequest(format!(
            "Invalid milestone status transition: {current:?} → {requested:?}"
        ))),
    }
}

/// Append a milestone to a fixed-price draft/pending contract and refresh
/// the contract total.
pub async fn add_milestone(
    db: &DatabaseConnection,
    contract_id: Uuid,
    input: CreateMilestone,
    user_id: Uuid,
) -> Result<milestones::Model, AppError> {
    if input.amount <= 0 {
        return Err(AppError::BadRequest(
            "Milestone amounts must be positive".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let contract = contract_db::get_contract_by_id(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.client_id != user_id {
        return Err(AppError::Forbidden(
            "Only the client can add milestones".to_string(),
        ));
    }
    if contract.contract_type != ContractType::Fixed {
        return Err(AppError::BadRequest(
            "Milestones are only valid on fixed-price contracts".to_string(),
        ));
    }
    if !matches!(
        contract.status,
        ContractStatus::Draft | ContractStatus::Pending
    ) {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; milestones can only be added before activation",
            contract.status
        )));
    }

    let existing = milestone_db::get_milestones_by_contract(&txn, contract.id).await?;
    let order_index = existing.len() as i32;

    let milestone =
        milestone_db::insert_milestone(&txn, contract.id, &contract.currency, order_index, &input)
            .await?;

    let total = milestone_db::sum_amounts(&txn, contract.id).await?;
    contract_db::set_total_amount(&txn, contract, total).await?;

    txn.commit().await?;

    Ok(milestone)
}

/// Edit a milestone before approval; amount changes refresh the contract
/// total in the same transaction.
pub async fn update_milestone(
    db: &DatabaseConnection,
    milestone_id: Uuid,
    patch: UpdateMilestone,
    user_id: Uuid,
) -> Result<milestones::Model, AppError> {
    if let Some(amount) = patch.amount {
        if amount <= 0 {
            return Err(AppError::BadRequest(
                "Milestone amounts must be positive".to_string(),
            ));
        }
    }

    let txn = db.begin().await?;

    let milestone = milestone_db::get_milestone_by_id(&txn, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;

    let contract = contract_db::get_contract_by_id(&txn, milestone.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for milestone not found".to_string()))?;

    if contract.client_id != user_id {
        return Err(AppError::Forbidden(
            "Only the client can update milestones".to_string(),
        ));
    }
    if !matches!(
        contract.status,
        ContractStatus::Draft | ContractStatus::Pending
    ) {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; milestones can only be edited before activation",
            contract.status
        )));
    }
    if milestone.status == Status::Approved {
        return Err(AppError::InvalidState(
            "Approved milestones are immutable".to_string(),
        ));
    }

    let amount_changed = patch.amount.is_some();
    let milestone = milestone_db::apply_patch(&txn, milestone, &patch).await?;

    if amount_changed {
        let total = milestone_db::sum_amounts(&txn, contract.id).await?;
        contract_db::set_total_amount(&txn, contract, total).await?;
    }

    txn.commit().await?;

    Ok(milestone)
}

/// Remove a milestone from a draft contract, re-indexing the survivors
/// and refreshing the total in the same transaction.
pub async fn delete_milestone(
    db: &DatabaseConnection,
    milestone_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let milestone = milestone_db::get_milestone_by_id(&txn, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;

    let contract = contract_db::get_contract_by_id(&txn, milestone.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for milestone not found".to_string()))?;

    if contract.client_id != user_id {
        return Err(AppError::Forbidden(
            "Only the client can delete milestones".to_string(),
        ));
    }
    if contract.status != ContractStatus::Draft {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; milestones can only be deleted from drafts",
            contract.status
        )));
    }

    milestone_db::delete_milestone(&txn, milestone.id).await?;
    milestone_db::reindex(&txn, contract.id).await?;

    let total = milestone_db::sum_amounts(&txn, contract.id).await?;
    contract_db::set_total_amount(&txn, contract, total).await?;

    txn.commit().await?;

    Ok(())
}

/// Drive a milestone through its workflow. Approval is coupled to the
/// escrow release: if the release fails, the approval rolls back with it.
/// A client moving a pending milestone to in_progress funds its escrow,
/// and a second funding attempt fails loudly with `AlreadyFunded`.
pub async fn set_milestone_status(
    db: &DatabaseConnection,
    gateway: &dyn SettlementGateway,
    notifier: &Notifier,
    milestone_id: Uuid,
    request: SetMilestoneStatus,
    user_id: Uuid,
) -> Result<milestones::Model, AppError> {
    if request.status == Status::Rejected
        && request
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .is_none_or(str::is_empty)
    {
        return Err(AppError::BadRequest(
            "A rejection reason is required".to_string(),
        ));
    }

    // Pre-read purely to route the client's fund-on-start request; every
    // check is re-done inside the transaction that writes.
    let milestone = milestone_db::get_milestone_by_id(db, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;
    let contract = contract_db::get_contract_by_id(db, milestone.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for milestone not found".to_string()))?;

    if contract.status != ContractStatus::Active {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; milestone status changes require an active contract",
            contract.status
        )));
    }

    let party = party_of(&contract, user_id)?;
    validate_transition(milestone.status, request.status, party)?;

    // The client starting work funds the escrow; fund_milestone advances
    // the milestone to in_progress itself.
    if request.status == Status::InProgress && party == Party::Client {
        escrow::fund_milestone(db, gateway, notifier, milestone_id, user_id).await?;
        return milestone_db::get_milestone_by_id(db, milestone_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")));
    }

    let txn = db.begin().await?;

    let milestone = milestone_db::get_milestone_by_id(&txn, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;
    let contract = contract_db::get_contract_by_id(&txn, milestone.contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract for milestone not found".to_string()))?;

    if contract.status != ContractStatus::Active {
        return Err(AppError::InvalidState(format!(
            "Contract is {:?}; milestone status changes require an active contract",
            contract.status
        )));
    }
    let party = party_of(&contract, user_id)?;
    validate_transition(milestone.status, request.status, party)?;

    let updated = match request.status {
        Status::InProgress => milestone_db::mark_in_progress(&txn, milestone).await?,
        Status::Submitted => {
            milestone_db::mark_submitted(&txn, milestone, request.attachment_urls.clone()).await?
        }
        Status::Approved => {
            let milestone = milestone_db::mark_approved(&txn, milestone, user_id).await?;
            // Approval and payment are one unit: a failed release rolls
            // the approval back.
            escrow::require_completed(
                escrow::release_milestone_in_txn(&txn, gateway, milestone.id, user_id).await?,
            )?;
            milestone
        }
        Status::Rejected => {
            let reason = request.rejection_reason.clone().unwrap_or_default();
            milestone_db::mark_rejected(&txn, milestone, user_id, reason).await?
        }
        Status::Pending => {
            return Err(AppError::BadRequest(
                "Milestones cannot move back to pending".to_string(),
            ));
        }
    };

    txn.commit().await?;

    match updated.status {
        Status::Submitted => notifier.notify(
            contract.client_id,
            kinds::MILESTONE_SUBMITTED,
            "A milestone was submitted for your review",
            Some(format!("/contracts/{}", contract.id)),
            serde_json::json!({ "milestone_id": updated.id }),
        ),
        Status::Approved => notifier.notify(
            contract.freelancer_id,
            kinds::MILESTONE_APPROVED,
            "Your milestone was approved and paid out",
            Some(format!("/contracts/{}", contract.id)),
            serde_json::json!({ "milestone_id": updated.id }),
        ),
        Status::Rejected => notifier.notify(
            contract.freelancer_id,
            kinds::MILESTONE_REJECTED,
            "Your milestone was rejected",
            Some(format!("/contracts/{}", contract.id)),
            serde_json::json!({
                "milestone_id": updated.id,
                "reason": updated.rejection_reason,
            }),
        ),
        _ => {}
    }

    Ok(updated)
}

/// Milestones of a contract visible to the caller, in order.
pub async fn list_milestones(
    db: &DatabaseConnection,
    contract_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<milestones::Model>, AppError> {
    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if !contract.is_party(user_id) {
        return Err(AppError::Forbidden(
            "You can only view milestones on your own contracts".to_string(),
        ));
    }

    Ok(milestone_db::get_milestones_by_contract(db, contract_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_or_freelancer_can_start_a_pending_milestone() {
        assert!(validate_transition(Status::Pending, Status::InProgress, Party::Client).is_ok());
        assert!(
            validate_transition(Status::Pending, Status::InProgress, Party::Freelancer).is_ok()
        );
    }

    #[test]
    fn only_the_freelancer_submits() {
        assert!(
            validate_transition(Status::InProgress, Status::Submitted, Party::Freelancer).is_ok()
        );
        assert!(validate_transition(Status::Pending, Status::Submitted, Party::Freelancer).is_ok());
        match validate_transition(Status::InProgress, Status::Submitted, Party::Client) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn freelancer_cannot_approve_their_own_milestone() {
        match validate_transition(Status::Submitted, Status::Approved, Party::Freelancer) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {other:?}"),
        }
        assert!(validate_transition(Status::Submitted, Status::Approved, Party::Client).is_ok());
    }

    #[test]
    fn only_the_client_rejects() {
        assert!(validate_transition(Status::Submitted, Status::Rejected, Party::Client).is_ok());
        match validate_transition(Status::Submitted, Status::Rejected, Party::Freelancer) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn rejected_milestones_restart_only_via_the_freelancer() {
        assert!(
            validate_transition(Status::Rejected, Status::InProgress, Party::Freelancer).is_ok()
        );
        match validate_transition(Status::Rejected, Status::InProgress, Party::Client) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn undefined_jumps_are_bad_requests() {
        let cases = [
            (Status::Pending, Status::Approved),
            (Status::InProgress, Status::Approved),
            (Status::Approved, Status::Submitted),
            (Status::Approved, Status::InProgress),
            (Status::Submitted, Status::InProgress),
        ];
        for (from, to) in cases {
            match validate_transition(from, to, Party::Client) {
                Err(AppError::BadRequest(_)) => {}
                other => panic!("expected BadRequest for {from:?} → {to:?}, got {other:?}"),
            }
        }
    }
}

use sea_orm::*;
use uuid::Uuid;

use crate::models::milestones::{self, CreateMilestone, Status, UpdateMilestone};

/// Insert a milestone at the given order index (caller picks the index).
pub async fn insert_milestone<C: ConnectionTrait>(
    conn: &C,
    contract_id: Uuid,
    currency: &str,
    order_index: i32,
    input: &CreateMilestone,
) -> Result<milestones::Model, DbErr> {
    let new_milestone = milestones::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(contract_id),
        title: Set(input.title.clone()),
        description: Set(input.description.clone()),
        amount: Set(input.amount),
        currency: Set(currency.to_string()),
        status: Set(Status::Pending),
        order_index: Set(order_index),
        due_date: Set(input.due_date),
        submitted_at: Set(None),
        approved_at: Set(None),
        approved_by_id: Set(None),
        rejected_at: Set(None),
        rejected_by_id: Set(None),
        rejection_reason: Set(None),
        attachment_urls: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_milestone.insert(conn).await
}

/// Fetch a single milestone by ID.
pub async fn get_milestone_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<milestones::Model>, DbErr> {
    milestones::Entity::find_by_id(id).one(conn).await
}

/// Fetch a contract's milestones ordered by their position.
pub async fn get_milestones_by_contract<C: ConnectionTrait>(
    conn: &C,
    contract_id: Uuid,
) -> Result<Vec<milestones::Model>, DbErr> {
    milestones::Entity::find()
        .filter(milestones::Column::ContractId.eq(contract_id))
        .order_by_asc(milestones::Column::OrderIndex)
        .all(conn)
        .await
}

/// Sum of milestone amounts for a contract (the fixed-contract total).
pub async fn sum_amounts<C: ConnectionTrait>(conn: &C, contract_id: Uuid) -> Result<i64, DbErr> {
    let milestones = get_milestones_by_contract(conn, contract_id).await?;
    Ok(milestones.iter().map(|m| m.amount).sum())
}

/// Apply a pre-approval patch to a milestone.
pub async fn apply_patch<C: ConnectionTrait>(
    conn: &C,
    milestone: milestones::Model,
    patch: &UpdateMilestone,
) -> Result<milestones::Model, DbErr> {
    let mut active: milestones::ActiveModel = milestone.into();

    if let Some(title) = &patch.title {
        active.title = Set(title.clone());
    }
    if let Some(description) = &patch.description {
        active.description = Set(Some(description.clone()));
    }
    if let Some(amount) = patch.amount {
        active.amount = Set(amount);
    }
    if let Some(due_date) = patch.due_date {
        active.due_date = Set(Some(due_date));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(conn).await
}

/// Delete a milestone. Re-indexing the survivors is the caller's concern
/// and must happen in the same transaction.
pub async fn delete_milestone<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<DeleteResult, DbErr> {
    milestones::Entity::delete_by_id(id).exec(conn).await
}

/// Rewrite order_index values to a contiguous 0..n-1 sequence.
pub async fn reindex<C: ConnectionTrait>(conn: &C, contract_id: Uuid) -> Result<(), DbErr> {
    let milestones = get_milestones_by_contract(conn, contract_id).await?;
    for (position, milestone) in milestones.into_iter().enumerate() {
        let position = position as i32;
        if milestone.order_index != position {
            let mut active: milestones::ActiveModel = milestone.into();
            active.order_index = Set(position);
            active.update(conn).await?;
        }
    }
    Ok(())
}

/// Move a milestone to InProgress (work started / escrow funded).
pub async fn mark_in_progress<C: ConnectionTrait>(
    conn: &C,
    milestone: milestones::Model,
) -> Result<milestones::Model, DbErr> {
    let mut active: milestones::ActiveModel = milestone.into();
    active.status = Set(Status::InProgress);
    active.updated_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

/// Record the freelancer's submission, with optional deliverable links.
pub async fn mark_submitted<C: ConnectionTrait>(
    conn: &C,
    milestone: milestones::Model,
    attachment_urls: Option<Vec<String>>,
) -> Result<milestones::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: milestones::ActiveModel = milestone.into();
    active.status = Set(Status::Submitted);
    active.submitted_at = Set(Some(now));
    if let Some(urls) = attachment_urls {
        active.attachment_urls = Set(Some(serde_json::json!(urls)));
    }
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

/// Record client approval. The caller couples this with the escrow release
/// in the same transaction.
pub async fn mark_approved<C: ConnectionTrait>(
    conn: &C,
    milestone: milestones::Model,
    approved_by: Uuid,
) -> Result<milestones::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: milestones::ActiveModel = milestone.into();
    active.status = Set(Status::Approved);
    active.approved_at = Set(Some(now));
    active.approved_by_id = Set(Some(approved_by));
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

/// Record client rejection with the mandatory reason.
pub async fn mark_rejected<C: ConnectionTrait>(
    conn: &C,
    milestone: milestones::Model,
    rejected_by: Uuid,
    reason: String,
) -> Result<milestones::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: milestones::ActiveModel = milestone.into();
    active.status = Set(Status::Rejected);
    active.rejected_at = Set(Some(now));
    active.rejected_by_id = Set(Some(rejected_by));
    active.rejection_reason = Set(Some(reason));
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

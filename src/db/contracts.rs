use sea_orm::*;
use uuid::Uuid;

use crate::models::contracts::{self, CreateContract, Status, UpdateContract};

/// Insert a new contract in Draft status. Milestone creation and total
/// recomputation are the caller's concern.
pub async fn insert_contract<C: ConnectionTrait>(
    conn: &C,
    input: &CreateContract,
) -> Result<contracts::Model, DbErr> {
    let new_contract = contracts::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(input.client_id),
        freelancer_id: Set(input.freelancer_id),
        company_id: Set(input.company_id),
        project_id: Set(input.project_id),
        proposal_id: Set(input.proposal_id),
        title: Set(input.title.clone()),
        description: Set(input.description.clone()),
        terms: Set(input.terms.clone()),
        contract_type: Set(input.contract_type),
        status: Set(Status::Draft),
        total_amount: Set(input.total_amount),
        currency: Set(input.currency.clone().unwrap_or_else(|| "USD".to_string())),
        hourly_rate: Set(input.hourly_rate),
        weekly_limit: Set(input.weekly_limit),
        signed_by_client_at: Set(None),
        signed_by_freelancer_at: Set(None),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        completed_at: Set(None),
        cancelled_at: Set(None),
        cancelled_by: Set(None),
        cancellation_reason: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_contract.insert(conn).await
}

/// Fetch a single contract by ID.
pub async fn get_contract_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find_by_id(id).one(conn).await
}

/// Fetch all contracts where the user is the client or the freelancer.
pub async fn get_contracts_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<contracts::Model>, DbErr> {
    contracts::Entity::find()
        .filter(
            Condition::any()
                .add(contracts::Column::ClientId.eq(user_id))
                .add(contracts::Column::FreelancerId.eq(user_id)),
        )
        .order_by_desc(contracts::Column::CreatedAt)
        .all(db)
        .await
}

/// Apply a draft-stage patch (everything except the status transition).
pub async fn apply_patch<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
    patch: &UpdateContract,
) -> Result<contracts::Model, DbErr> {
    let mut active: contracts::ActiveModel = contract.into();

    if let Some(title) = &patch.title {
        active.title = Set(title.clone());
    }
    if let Some(description) = &patch.description {
        active.description = Set(Some(description.clone()));
    }
    if let Some(terms) = &patch.terms {
        active.terms = Set(Some(terms.clone()));
    }
    if let Some(total_amount) = patch.total_amount {
        active.total_amount = Set(Some(total_amount));
    }
    if let Some(hourly_rate) = patch.hourly_rate {
        active.hourly_rate = Set(Some(hourly_rate));
    }
    if let Some(weekly_limit) = patch.weekly_limit {
        active.weekly_limit = Set(Some(weekly_limit));
    }
    if let Some(start_date) = patch.start_date {
        active.start_date = Set(Some(start_date));
    }
    if let Some(end_date) = patch.end_date {
        active.end_date = Set(Some(end_date));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(conn).await
}

/// Overwrite the cached milestone total on a fixed contract.
pub async fn set_total_amount<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
    total: i64,
) -> Result<contracts::Model, DbErr> {
    let mut active: contracts::ActiveModel = contract.into();
    active.total_amount = Set(Some(total));
    active.updated_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

/// Move a draft to Pending (client finalized the draft).
pub async fn mark_pending<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
) -> Result<contracts::Model, DbErr> {
    let mut active: contracts::ActiveModel = contract.into();
    active.status = Set(Status::Pending);
    active.updated_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

/// Record one party's signature; does not change the contract status.
pub async fn record_signature<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
    signer_is_client: bool,
) -> Result<contracts::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: contracts::ActiveModel = contract.into();
    if signer_is_client {
        active.signed_by_client_at = Set(Some(now));
    } else {
        active.signed_by_freelancer_at = Set(Some(now));
    }
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

/// Activate a fully signed contract, defaulting the start date to now.
pub async fn activate<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
) -> Result<contracts::Model, DbErr> {
    let now = chrono::Utc::now();
    let start_date = contract.start_date.unwrap_or(now);
    let mut active: contracts::ActiveModel = contract.into();
    active.status = Set(Status::Active);
    active.start_date = Set(Some(start_date));
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

/// Record cancellation metadata and set the terminal Cancelled status.
pub async fn cancel<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
    cancelled_by: Uuid,
    reason: Option<String>,
) -> Result<contracts::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: contracts::ActiveModel = contract.into();
    active.status = Set(Status::Cancelled);
    active.cancelled_at = Set(Some(now));
    active.cancelled_by = Set(Some(cancelled_by));
    active.cancellation_reason = Set(reason);
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

/// Set the terminal Completed status.
pub async fn complete<C: ConnectionTrait>(
    conn: &C,
    contract: contracts::Model,
) -> Result<contracts::Model, DbErr> {
    let now = chrono::Utc::now();
    let mut active: contracts::ActiveModel = contract.into();
    active.status = Set(Status::Completed);
    active.completed_at = Set(Some(now));
    active.updated_at = Set(Some(now));
    active.update(conn).await
}

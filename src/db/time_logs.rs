use sea_orm::*;
use uuid::Uuid;

use crate::models::time_logs::{self, CreateTimeLog};

/// Insert a freelancer-reported work interval. Duration is precomputed by
/// the caller (nearest minute).
pub async fn insert_time_log<C: ConnectionTrait>(
    conn: &C,
    contract_id: Uuid,
    freelancer_id: Uuid,
    duration_minutes: i32,
    input: &CreateTimeLog,
) -> Result<time_logs::Model, DbErr> {
    let new_time_log = time_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(contract_id),
        freelancer_id: Set(freelancer_id),
        description: Set(input.description.clone()),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        duration_minutes: Set(duration_minutes),
        is_billable: Set(input.is_billable.unwrap_or(true)),
        is_approved: Set(None),
        approved_by_id: Set(None),
        approved_at: Set(None),
        rejected_at: Set(None),
        rejection_reason: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    new_time_log.insert(conn).await
}

/// Fetch a single time log by ID.
pub async fn get_time_log_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<time_logs::Model>, DbErr> {
    time_logs::Entity::find_by_id(id).one(conn).await
}

/// Fetch a contract's time logs, newest first.
pub async fn get_time_logs_by_contract<C: ConnectionTrait>(
    conn: &C,
    contract_id: Uuid,
) -> Result<Vec<time_logs::Model>, DbErr> {
    time_logs::Entity::find()
        .filter(time_logs::Column::ContractId.eq(contract_id))
        .order_by_desc(time_logs::Column::StartTime)
        .all(conn)
        .await
}

/// Record client approval of an entry.
pub async fn mark_approved<C: ConnectionTrait>(
    conn: &C,
    time_log: time_logs::Model,
    approved_by: Uuid,
) -> Result<time_logs::Model, DbErr> {
    let mut active: time_logs::ActiveModel = time_log.into();
    active.is_approved = Set(Some(true));
    active.approved_by_id = Set(Some(approved_by));
    active.approved_at = Set(Some(chrono::Utc::now()));
    active.update(conn).await
}

/// Record client rejection of an entry with the mandatory reason.
pub async fn mark_rejected<C: ConnectionTrait>(
    conn: &C,
    time_log: time_logs::Model,
    reason: String,
) -> Result<time_logs::Model, DbErr> {
    let mut active: time_logs::ActiveModel = time_log.into();
    active.is_approved = Set(Some(false));
    active.rejected_at = Set(Some(chrono::Utc::now()));
    active.rejection_reason = Set(Some(reason));
    active.update(conn).await
}

use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::models::milestones::{CreateMilestone, SetMilestoneStatus, UpdateMilestone};
use crate::notify::Notifier;
use crate::services::escrow;
use crate::services::milestones as milestone_service;
use crate::services::settlement::SettlementData;

/// GET /api/contracts/{id}/milestones — ordered milestones, parties only.
pub async fn get_milestones(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let milestones =
        milestone_service::list_milestones(db.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(milestones))
}

/// POST /api/contracts/{id}/milestones — client appends a milestone to a
/// fixed-price contract still in draft/pending.
pub async fn add_milestone(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreateMilestone>,
) -> Result<HttpResponse, AppError> {
    let milestone = milestone_service::add_milestone(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(milestone))
}

/// PUT /api/milestones/{id} — client edits a milestone before approval.
pub async fn update_milestone(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMilestone>,
) -> Result<HttpResponse, AppError> {
    let milestone = milestone_service::update_milestone(
        db.get_ref(),
        path.into_inner(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(milestone))
}

/// DELETE /api/milestones/{id} — client removes a milestone from a draft.
pub async fn delete_milestone(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let milestone_id = path.into_inner();
    milestone_service::delete_milestone(db.get_ref(), milestone_id, user.0.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Milestone {milestone_id} deleted"),
    })))
}

/// PUT /api/milestones/{id}/status — drive the milestone workflow
/// (start, submit, approve, reject).
pub async fn set_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<SetMilestoneStatus>,
) -> Result<HttpResponse, AppError> {
    let milestone = milestone_service::set_milestone_status(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        path.into_inner(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(milestone))
}

/// POST /api/milestones/{id}/fund — client funds the milestone's escrow
/// directly (manual retry path when activation-time funding failed).
pub async fn fund_milestone(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment = escrow::fund_milestone(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(payment))
}

/// POST /api/milestones/{id}/release — client releases the escrowed funds
/// to the freelancer.
pub async fn release_milestone(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment = escrow::release_milestone_payment(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(payment))
}

use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::models::time_logs::{CreateTimeLog, ReviewTimeLog};
use crate::notify::Notifier;
use crate::services::escrow;
use crate::services::settlement::SettlementData;
use crate::services::time_logs as time_log_service;

/// GET /api/contracts/{id}/time-logs — logged hours, parties only.
pub async fn get_time_logs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let time_logs =
        time_log_service::list_time_logs(db.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(time_logs))
}

/// POST /api/contracts/{id}/time-logs — the freelancer logs a work
/// interval on an active hourly contract.
pub async fn create_time_log(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<CreateTimeLog>,
) -> Result<HttpResponse, AppError> {
    let time_log = time_log_service::create_time_log(
        db.get_ref(),
        notifier.get_ref(),
        path.into_inner(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(time_log))
}

/// POST /api/time-logs/{id}/pay — the client pays a billable entry
/// directly (manual retry path when the review-time payment failed).
pub async fn pay_time_log(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment = escrow::pay_time_log(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(payment))
}

/// PUT /api/time-logs/{id}/review — the client approves (and pays) or
/// rejects a logged interval.
pub async fn review_time_log(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<ReviewTimeLog>,
) -> Result<HttpResponse, AppError> {
    let time_log = time_log_service::review_time_log(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        path.into_inner(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(time_log))
}

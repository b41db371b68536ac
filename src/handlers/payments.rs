use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::models::payments::{CreateManualPayment, PaymentFilters, RefundPayment};
use crate::notify::Notifier;
use crate::services::escrow;
use crate::services::settlement::SettlementData;

/// GET /api/payments — payments where the caller is payer or payee.
/// Supports `contract_id` and `status` query filters.
pub async fn get_payments(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    filters: web::Query<PaymentFilters>,
) -> Result<HttpResponse, AppError> {
    let payments = escrow::list_payments(db.get_ref(), user.0.id, &filters.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payments))
}

/// GET /api/payments/{id} — single payment, payer or payee only.
pub async fn get_payment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment = escrow::get_payment(db.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

/// POST /api/payments/manual — client sends a one-off payment on an
/// active contract, outside the milestone / time log flows.
pub async fn create_manual_payment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    body: web::Json<CreateManualPayment>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let payment = escrow::create_manual_payment(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        body.contract_id,
        body.amount,
        body.description,
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(payment))
}

/// POST /api/payments/{id}/refund — the payer refunds a completed,
/// non-escrow payment.
pub async fn refund_payment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<RefundPayment>,
) -> Result<HttpResponse, AppError> {
    let payment = escrow::refund_payment(
        db.get_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
        body.into_inner().reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(payment))
}

use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::models::contracts::{CancelContract, CreateContract, UpdateContract};
use crate::notify::Notifier;
use crate::services::contracts as contract_service;
use crate::services::settlement::SettlementData;

/// POST /api/contracts — the client drafts a contract with a freelancer.
///
/// Milestones may be supplied inline; a fixed contract with only a total
/// gets a single auto-created milestone.
pub async fn create_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    body: web::Json<CreateContract>,
) -> Result<HttpResponse, AppError> {
    let contract = contract_service::create_contract(
        db.get_ref(),
        notifier.get_ref(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Created().json(contract))
}

/// GET /api/contracts — contracts where the caller is client or freelancer.
pub async fn get_contracts(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let contracts = contract_service::list_contracts(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(contracts))
}

/// GET /api/contracts/{id} — single contract, parties only.
pub async fn get_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let contract =
        contract_service::get_contract(db.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(contract))
}

/// PUT /api/contracts/{id} — client edits a draft; `status: "pending"`
/// finalizes it for the freelancer's review.
pub async fn update_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContract>,
) -> Result<HttpResponse, AppError> {
    let contract = contract_service::update_contract(
        db.get_ref(),
        notifier.get_ref(),
        path.into_inner(),
        body.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// POST /api/contracts/{id}/sign — either party signs; the second
/// signature activates the contract and funds its first milestone.
pub async fn sign_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    settlement: web::Data<SettlementData>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let contract = contract_service::sign_contract(
        db.get_ref(),
        settlement.get_ref().as_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// POST /api/contracts/{id}/cancel — either party cancels a non-terminal
/// contract; held escrow is refunded to the client.
pub async fn cancel_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<CancelContract>,
) -> Result<HttpResponse, AppError> {
    let contract = contract_service::cancel_contract(
        db.get_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
        body.into_inner().reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// POST /api/contracts/{id}/complete — client completes an active
/// contract once every milestone is approved.
pub async fn complete_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let contract = contract_service::complete_contract(
        db.get_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.0.id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(contract))
}

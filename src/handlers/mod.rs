pub mod contracts;
pub mod milestones;
pub mod payments;
pub mod time_logs;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Contract routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(contracts::get_contracts))
            .route("", web::post().to(contracts::create_contract))
            .route("/{id}", web::get().to(contracts::get_contract))
            .route("/{id}", web::put().to(contracts::update_contract))
            .route("/{id}/sign", web::post().to(contracts::sign_contract))
            .route("/{id}/cancel", web::post().to(contracts::cancel_contract))
            .route("/{id}/complete", web::post().to(contracts::complete_contract))
            .route("/{id}/milestones", web::get().to(milestones::get_milestones))
            .route("/{id}/milestones", web::post().to(milestones::add_milestone))
            .route("/{id}/time-logs", web::get().to(time_logs::get_time_logs))
            .route("/{id}/time-logs", web::post().to(time_logs::create_time_log)),
    );

    // ── Milestone routes ──
    cfg.service(
        web::scope("/milestones")
            .route("/{id}", web::put().to(milestones::update_milestone))
            .route("/{id}", web::delete().to(milestones::delete_milestone))
            .route("/{id}/status", web::put().to(milestones::set_status))
            .route("/{id}/fund", web::post().to(milestones::fund_milestone))
            .route("/{id}/release", web::post().to(milestones::release_milestone)),
    );

    // ── Time log routes ──
    cfg.service(
        web::scope("/time-logs")
            .route("/{id}/review", web::put().to(time_logs::review_time_log))
            .route("/{id}/pay", web::post().to(time_logs::pay_time_log)),
    );

    // ── Payment routes ──
    cfg.service(
        web::scope("/payments")
            .route("", web::get().to(payments::get_payments))
            .route("/manual", web::post().to(payments::create_manual_payment))
            .route("/{id}", web::get().to(payments::get_payment))
            .route("/{id}/refund", web::post().to(payments::refund_payment)),
    );
}

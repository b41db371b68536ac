use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use milepay_backend::auth::middleware::JwtSecret;
use milepay_backend::create_pool;
use milepay_backend::handlers;
use milepay_backend::notify::Notifier;
use milepay_backend::services::settlement::{InstantSettlement, SettlementData};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let db = create_pool().await;
    let db_data = web::Data::new(db);

    // Notification dispatcher: best-effort Redis pub/sub, optional in dev.
    let notifier = match std::env::var("REDIS_URL") {
        Ok(redis_url) => {
            let notifier = Notifier::new(&redis_url)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Connected to Redis for notifications");
            notifier
        }
        Err(_) => {
            tracing::warn!("REDIS_URL not set; notifications will be dropped");
            Notifier::disconnected()
        }
    };
    let notifier_data = web::Data::new(notifier);

    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let jwt_data = web::Data::new(JwtSecret(jwt_secret));

    // Simulated settlement today; swap the gateway when a real payment
    // processor is integrated.
    let settlement: SettlementData = Arc::new(InstantSettlement);
    let settlement_data = web::Data::new(settlement);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{port}");
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(notifier_data.clone())
            .app_data(jwt_data.clone())
            .app_data(settlement_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}

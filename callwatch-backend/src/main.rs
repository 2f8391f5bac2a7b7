use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod db;
mod models;
mod reconcile;
mod validate;

use config::Config;
use db::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    // Repair any flags left inconsistent by a previous crash before
    // serving traffic.
    match reconcile::reconcile_call_flags(&db) {
        Ok(report) if report.corrected > 0 || report.failed > 0 => {
            log::info!(
                "Startup flag reconciliation: {} examined, {} corrected, {} failed",
                report.examined,
                report.corrected,
                report.failed
            );
        }
        Ok(_) => {}
        Err(e) => log::warn!("Startup flag reconciliation failed: {}", e),
    }

    log::info!("Starting call-management server on port {}", port);

    HttpServer::new(move || {
        let cors = match &config.cors_allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
            None => Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
        };

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::calls::config)
            .configure(controllers::transcripts::config)
            .configure(controllers::summaries::config)
            .configure(controllers::contacts::config)
            .configure(controllers::spam_rules::config)
            .configure(controllers::insights::config)
            .configure(controllers::stats::config)
            .configure(controllers::dashboard::config)
            .configure(controllers::admin::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

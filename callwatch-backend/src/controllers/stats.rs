use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

use super::db_error;

/// Serve the latest stored stats snapshot, computing one on the fly when
/// nothing has been stored yet.
async fn get_stats(data: web::Data<AppState>) -> impl Responder {
    let stored = match data.db.latest_call_stats() {
        Ok(s) => s,
        Err(e) => return db_error("Failed to load stats snapshot", e),
    };

    let stats = match stored {
        Some(stats) => stats,
        None => match data.db.compute_call_stats() {
            Ok(stats) => stats,
            Err(e) => return db_error("Failed to compute stats", e),
        },
    };

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "stats": stats
    }))
}

/// Recompute aggregates from the calls table and replace the stored
/// snapshot, deriving the change-over-previous deltas from the snapshot
/// being replaced.
async fn recompute_stats(data: web::Data<AppState>) -> impl Responder {
    match data.db.replace_call_stats() {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "stats": stats,
            "message": "Call stats recomputed successfully"
        })),
        Err(e) => db_error("Failed to recompute stats", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/stats")
            .route("", web::get().to(get_stats))
            .route("/recompute", web::post().to(recompute_stats)),
    );
}

use actix_web::{web, HttpResponse, Responder};

use crate::reconcile::reconcile_call_flags;
use crate::AppState;

use super::db_error;

/// Run the call-flag consistency sweep on demand. Per-record failures are
/// already tallied inside the report; only a failure to scan at all is a 500.
async fn run_reconcile(data: web::Data<AppState>) -> impl Responder {
    match reconcile_call_flags(&data.db) {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "report": report
        })),
        Err(e) => db_error("Flag reconciliation failed", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/admin/reconcile").route(web::post().to(run_reconcile)));
}

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::validate::{validate_new_summary, validate_summary_update};
use crate::AppState;

use super::{db_error, is_unique_violation, parse_body, reconcile_after_write, reject};

/// Store an AI-generated summary for a call, flip the call's summary flag,
/// and run the consistency sweep.
async fn create_summary(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new_summary = match validate_new_summary(&data.db, &payload) {
        Ok(s) => s,
        Err(f) => return reject(f, "Summary validation failed"),
    };

    let summary_id = match data.db.insert_call_summary(&new_summary) {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "success": false,
                "error": "Summary already exists for this call"
            }))
        }
        Err(e) => return db_error("Failed to create summary", e),
    };

    if let Err(e) = data.db.mark_call_summarized(&new_summary.call_id) {
        log::warn!(
            "Failed to flag call {} as summarized: {}",
            new_summary.call_id,
            e
        );
    }
    reconcile_after_write(&data.db);

    HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "summaryId": summary_id,
        "message": "Summary created successfully"
    }))
}

#[derive(Deserialize)]
struct SummaryQuery {
    #[serde(rename = "callId")]
    call_id: Option<String>,
}

async fn get_summary(data: web::Data<AppState>, query: web::Query<SummaryQuery>) -> impl Responder {
    let call_id = match &query.call_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "Missing required field: callId"
            }))
        }
    };

    match data.db.get_summary_by_call(call_id) {
        Ok(Some(summary)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "summary": summary
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Summary not found"
        })),
        Err(e) => db_error("Failed to get summary", e),
    }
}

async fn update_summary(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (call_id, update) = match validate_summary_update(&data.db, &payload) {
        Ok(u) => u,
        Err(f) => return reject(f, "Summary update validation failed"),
    };

    match data.db.update_call_summary(&call_id, &update) {
        Ok(Some(_)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Summary updated successfully"
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Summary not found"
        })),
        Err(e) => db_error("Failed to update summary", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/summaries")
            .route("", web::post().to(create_summary))
            .route("", web::get().to(get_summary))
            .route("", web::put().to(update_summary)),
    );
}

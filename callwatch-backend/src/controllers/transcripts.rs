use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::validate::{validate_new_transcript, validate_transcript_update};
use crate::AppState;

use super::{db_error, is_unique_violation, parse_body, reconcile_after_write, reject};

fn duplicate_transcript() -> HttpResponse {
    HttpResponse::Conflict().json(serde_json::json!({
        "success": false,
        "error": "Transcript already exists for this call"
    }))
}

/// Attach a transcript to a call, flip the call's transcript flag, and run
/// the consistency sweep. A UNIQUE violation on insert means a concurrent
/// request won the race; it gets the same 409 as the early check.
async fn create_transcript(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new_transcript = match validate_new_transcript(&data.db, &payload) {
        Ok(t) => t,
        Err(f) => return reject(f, "Transcript validation failed"),
    };

    let transcript_id = match data.db.insert_transcript(&new_transcript) {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => return duplicate_transcript(),
        Err(e) => return db_error("Failed to create transcript", e),
    };

    if let Err(e) = data.db.mark_call_transcribed(&new_transcript.call_id) {
        log::warn!(
            "Failed to flag call {} as transcribed: {}",
            new_transcript.call_id,
            e
        );
    }
    reconcile_after_write(&data.db);

    HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "transcriptId": transcript_id,
        "message": "Transcript created successfully"
    }))
}

#[derive(Deserialize)]
struct TranscriptQuery {
    #[serde(rename = "callId")]
    call_id: Option<String>,
}

async fn get_transcript(
    data: web::Data<AppState>,
    query: web::Query<TranscriptQuery>,
) -> impl Responder {
    let call_id = match &query.call_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "Missing required field: callId"
            }))
        }
    };

    match data.db.get_transcript_by_call(call_id) {
        Ok(Some(transcript)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "transcript": transcript
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Transcript not found"
        })),
        Err(e) => db_error("Failed to get transcript", e),
    }
}

async fn update_transcript(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (call_id, update) = match validate_transcript_update(&data.db, &payload) {
        Ok(u) => u,
        Err(f) => return reject(f, "Transcript update validation failed"),
    };

    match data.db.update_transcript(&call_id, &update) {
        Ok(Some(transcript)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "transcript": transcript
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Transcript not found"
        })),
        Err(e) => db_error("Failed to update transcript", e),
    }
}

/// Remove a call's transcript and clear the denormalized flag so list
/// views stop advertising one.
async fn delete_transcript(
    data: web::Data<AppState>,
    query: web::Query<TranscriptQuery>,
) -> impl Responder {
    let call_id = match &query.call_id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "Missing required field: callId"
            }))
        }
    };

    match data.db.delete_transcript(&call_id) {
        Ok(true) => {
            if let Err(e) = data.db.clear_call_transcript_flag(&call_id) {
                log::warn!("Failed to clear transcript flag for call {}: {}", call_id, e);
            }
            reconcile_after_write(&data.db);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Transcript deleted successfully"
            }))
        }
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Transcript not found"
        })),
        Err(e) => db_error("Failed to delete transcript", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/transcripts")
            .route("", web::post().to(create_transcript))
            .route("", web::get().to(get_transcript))
            .route("", web::put().to(update_transcript))
            .route("", web::delete().to(delete_transcript)),
    );
}

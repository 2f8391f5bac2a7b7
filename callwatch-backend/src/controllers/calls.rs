use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::models::{CallStatus, CallType};
use crate::validate::{validate_call_update, validate_new_call};
use crate::AppState;

use super::{db_error, parse_body, reject};

/// Record a completed call. The contact call counter bump is best-effort;
/// the call record is already committed when it runs.
async fn create_call(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new_call = match validate_new_call(&data.db, &payload) {
        Ok(c) => c,
        Err(f) => return reject(f, "Call validation failed"),
    };

    let call_id = match data.db.insert_call(&new_call) {
        Ok(id) => id,
        Err(e) => return db_error("Failed to create call", e),
    };

    if let Some(contact_id) = &new_call.contact_id {
        if let Err(e) = data.db.increment_contact_call_count(contact_id) {
            log::warn!("Failed to bump call count for contact {}: {}", contact_id, e);
        }
    }

    HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "callId": call_id,
        "message": "Call record created successfully"
    }))
}

#[derive(Deserialize)]
struct CallsQuery {
    #[serde(rename = "callId")]
    call_id: Option<String>,
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
    #[serde(rename = "type")]
    call_type: Option<String>,
    status: Option<String>,
    limit: Option<String>,
}

/// Fetch one call by id, or list calls filtered by phone number, type,
/// status, and limit. Unrecognized filter values are ignored rather than
/// rejected so stale dashboard links still return a list.
async fn get_calls(data: web::Data<AppState>, query: web::Query<CallsQuery>) -> impl Responder {
    if let Some(call_id) = &query.call_id {
        return match data.db.get_call(call_id) {
            Ok(Some(call)) => HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "call": call
            })),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": "Call not found"
            })),
            Err(e) => db_error("Failed to get call", e),
        };
    }

    let call_type = query.call_type.as_deref().and_then(CallType::from_str);
    let status = query.status.as_deref().and_then(CallStatus::from_str);
    let limit = query.limit.as_deref().and_then(|s| s.parse::<i64>().ok());

    match data
        .db
        .list_calls(query.phone_number.as_deref(), call_type, status, limit)
    {
        Ok(calls) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": calls.len(),
            "calls": calls
        })),
        Err(e) => db_error("Failed to list calls", e),
    }
}

async fn update_call(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (call_id, update) = match validate_call_update(&data.db, &payload) {
        Ok(u) => u,
        Err(f) => return reject(f, "Call update validation failed"),
    };

    match data.db.update_call(&call_id, &update) {
        Ok(Some(call)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "call": call,
            "message": "Call updated successfully"
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Call not found"
        })),
        Err(e) => db_error("Failed to update call", e),
    }
}

/// A call with its transcript and summary attached, for the detail view.
async fn get_call_details(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let call_id = path.into_inner();

    let call = match data.db.get_call(&call_id) {
        Ok(Some(call)) => call,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": "Call not found"
            }))
        }
        Err(e) => return db_error("Failed to get call", e),
    };

    let transcript = match data.db.get_transcript_by_call(&call_id) {
        Ok(t) => t,
        Err(e) => return db_error("Failed to get transcript", e),
    };
    let summary = match data.db.get_summary_by_call(&call_id) {
        Ok(s) => s,
        Err(e) => return db_error("Failed to get summary", e),
    };

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "call": call,
        "transcript": transcript,
        "summary": summary
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/calls")
            .route("", web::post().to(create_call))
            .route("", web::get().to(get_calls))
            .route("", web::put().to(update_call))
            .route("/{id}/details", web::get().to(get_call_details)),
    );
}

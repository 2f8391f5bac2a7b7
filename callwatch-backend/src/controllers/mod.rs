pub mod admin;
pub mod calls;
pub mod contacts;
pub mod dashboard;
pub mod health;
pub mod insights;
pub mod spam_rules;
pub mod stats;
pub mod summaries;
pub mod transcripts;

#[cfg(test)]
mod api_tests;

use actix_web::{web, HttpResponse};
use serde_json::Value;

use crate::db::Database;
use crate::reconcile::reconcile_call_flags;
use crate::validate::{ValidateFailure, ValidationError};

/// Parse a raw request body. Anything that is not valid JSON gets a
/// uniform 400 before any field-level validation runs.
pub(crate) fn parse_body(bytes: &web::Bytes) -> Result<Value, HttpResponse> {
    serde_json::from_slice(bytes).map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Invalid JSON in request body"
        }))
    })
}

/// Map a validation outcome onto the status it dictates: shape and
/// reference violations are 400, a missing primary resource is 404, a
/// duplicate transcript/summary is 409.
pub(crate) fn reject(failure: ValidateFailure, context: &str) -> HttpResponse {
    match failure {
        ValidateFailure::Rejected(e) => {
            let body = serde_json::json!({
                "success": false,
                "error": e.message()
            });
            match e {
                ValidationError::Invalid { .. } => HttpResponse::BadRequest().json(body),
                ValidationError::NotFound { .. } => HttpResponse::NotFound().json(body),
                ValidationError::Conflict { .. } => HttpResponse::Conflict().json(body),
            }
        }
        ValidateFailure::Db(e) => db_error(context, e),
    }
}

pub(crate) fn db_error(context: &str, e: rusqlite::Error) -> HttpResponse {
    log::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": "Database error",
        "details": e.to_string()
    }))
}

/// Run the flag sweep after a write that changed transcript/summary rows.
/// The write already succeeded, so a sweep failure is logged, not surfaced.
pub(crate) fn reconcile_after_write(db: &Database) {
    if let Err(e) = reconcile_call_flags(db) {
        log::warn!("Post-write flag reconciliation failed: {}", e);
    }
}

/// UNIQUE constraint violations on insert mean another request created the
/// row between our existence check and the write; callers map this to the
/// same 409 as the early check.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

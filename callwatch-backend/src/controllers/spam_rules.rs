use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::validate::{validate_new_spam_rule, validate_spam_rule_update};
use crate::AppState;

use super::{db_error, parse_body, reject};

async fn create_spam_rule(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new_rule = match validate_new_spam_rule(&payload) {
        Ok(r) => r,
        Err(f) => return reject(f, "Spam rule validation failed"),
    };

    match data.db.insert_spam_rule(&new_rule) {
        Ok(rule_id) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "ruleId": rule_id,
            "message": "Spam rule created successfully"
        })),
        Err(e) => db_error("Failed to create spam rule", e),
    }
}

#[derive(Deserialize)]
struct SpamRulesQuery {
    active: Option<String>,
}

async fn get_spam_rules(
    data: web::Data<AppState>,
    query: web::Query<SpamRulesQuery>,
) -> impl Responder {
    let active_only = query.active.as_deref() == Some("true");

    match data.db.list_spam_rules(active_only) {
        Ok(rules) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": rules.len(),
            "rules": rules
        })),
        Err(e) => db_error("Failed to list spam rules", e),
    }
}

async fn update_spam_rule(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (rule_id, update) = match validate_spam_rule_update(&data.db, &payload) {
        Ok(u) => u,
        Err(f) => return reject(f, "Spam rule update validation failed"),
    };

    match data.db.update_spam_rule(&rule_id, &update) {
        Ok(Some(rule)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "rule": rule,
            "message": "Spam rule updated successfully"
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Spam rule not found"
        })),
        Err(e) => db_error("Failed to update spam rule", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/spam-rules")
            .route("", web::post().to(create_spam_rule))
            .route("", web::get().to(get_spam_rules))
            .route("", web::put().to(update_spam_rule)),
    );
}

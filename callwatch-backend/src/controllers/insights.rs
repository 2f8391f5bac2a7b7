use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::validate::validate_new_insight;
use crate::AppState;

use super::{db_error, parse_body, reject};

const DEFAULT_INSIGHT_LIMIT: i64 = 50;

async fn create_insight(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new_insight = match validate_new_insight(&payload) {
        Ok(i) => i,
        Err(f) => return reject(f, "Insight validation failed"),
    };

    match data.db.insert_insight(&new_insight) {
        Ok(insight_id) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "insightId": insight_id,
            "message": "Insight created successfully"
        })),
        Err(e) => db_error("Failed to create insight", e),
    }
}

#[derive(Deserialize)]
struct InsightsQuery {
    actionable: Option<String>,
    limit: Option<String>,
}

async fn get_insights(data: web::Data<AppState>, query: web::Query<InsightsQuery>) -> impl Responder {
    let actionable_only = query.actionable.as_deref() == Some("true");
    let limit = query
        .limit
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_INSIGHT_LIMIT);

    match data.db.list_insights(actionable_only, limit) {
        Ok(insights) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": insights.len(),
            "insights": insights
        })),
        Err(e) => db_error("Failed to list insights", e),
    }
}

async fn mark_read(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let insight_id = path.into_inner();

    match data.db.mark_insight_read(&insight_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Insight marked as read"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Insight not found"
        })),
        Err(e) => db_error("Failed to mark insight read", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/insights")
            .route("", web::post().to(create_insight))
            .route("", web::get().to(get_insights))
            .route("/{id}/read", web::post().to(mark_read)),
    );
}

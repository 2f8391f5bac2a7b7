use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

use super::db_error;

const RECENT_CALLS_LIMIT: i64 = 10;
const ACTIONABLE_INSIGHTS_LIMIT: i64 = 20;

/// Everything the dashboard's landing view needs in one request: contacts,
/// the most recent calls, active spam rules, unhandled insights, and the
/// current stats.
async fn get_dashboard(data: web::Data<AppState>) -> impl Responder {
    let contacts = match data.db.list_contacts(None, None) {
        Ok(c) => c,
        Err(e) => return db_error("Failed to load dashboard contacts", e),
    };
    let recent_calls = match data.db.list_calls(None, None, None, Some(RECENT_CALLS_LIMIT)) {
        Ok(c) => c,
        Err(e) => return db_error("Failed to load dashboard calls", e),
    };
    let spam_rules = match data.db.list_spam_rules(true) {
        Ok(r) => r,
        Err(e) => return db_error("Failed to load dashboard spam rules", e),
    };
    let insights = match data.db.list_insights(true, ACTIONABLE_INSIGHTS_LIMIT) {
        Ok(i) => i,
        Err(e) => return db_error("Failed to load dashboard insights", e),
    };

    let stored = match data.db.latest_call_stats() {
        Ok(s) => s,
        Err(e) => return db_error("Failed to load dashboard stats", e),
    };
    let stats = match stored {
        Some(stats) => stats,
        None => match data.db.compute_call_stats() {
            Ok(stats) => stats,
            Err(e) => return db_error("Failed to compute dashboard stats", e),
        },
    };

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "contacts": contacts,
        "recentCalls": recent_calls,
        "spamRules": spam_rules,
        "insights": insights,
        "stats": stats
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/dashboard").route(web::get().to(get_dashboard)));
}

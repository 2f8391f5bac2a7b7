//! End-to-end handler tests against an in-memory store.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use crate::config::Config;
use crate::db::Database;
use crate::AppState;

fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState {
        db: Arc::new(Database::new(":memory:").unwrap()),
        config: Config {
            port: 0,
            database_url: ":memory:".to_string(),
            cors_allowed_origin: None,
        },
    })
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .configure(super::calls::config)
                .configure(super::transcripts::config)
                .configure(super::summaries::config)
                .configure(super::admin::config),
        )
        .await
    };
}

fn call_payload() -> Value {
    json!({
        "phoneNumber": "+1-555-0100",
        "type": "personal",
        "status": "allowed",
        "duration": 120,
        "timestamp": "2024-01-01T10:00:00.000Z",
        "isSpam": false,
        "confidence": 95
    })
}

fn transcript_payload(call_id: &str) -> Value {
    json!({
        "callId": call_id,
        "transcript": [
            { "role": "user", "response": "hi" }
        ]
    })
}

fn summary_payload(call_id: &str) -> Value {
    json!({
        "callId": call_id,
        "summary": "Caller asked about an invoice.",
        "intent": {
            "primary": "billing",
            "confidence": 0.9,
            "keywords": ["invoice"],
            "sentiment": "neutral",
            "urgency": "low"
        },
        "keyPoints": [],
        "followUpRequired": false
    })
}

async fn post_json<S, B>(app: &S, uri: &str, payload: &Value) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

async fn get_json<S, B>(app: &S, uri: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_web::test]
async fn test_create_call_then_fetch_round_trip() {
    let app = test_app!(test_state());

    let (status, body) = post_json(&app, "/api/calls", &call_payload()).await;
    assert_eq!(status, 201);
    assert_eq!(body["success"], json!(true));
    let call_id = body["callId"].as_str().expect("callId in response");

    let (status, body) = get_json(&app, &format!("/api/calls?callId={}", call_id)).await;
    assert_eq!(status, 200);
    let call = &body["call"];
    assert_eq!(call["phoneNumber"], json!("+1-555-0100"));
    assert_eq!(call["type"], json!("personal"));
    assert_eq!(call["hasTranscript"], json!(false));
    assert_eq!(call["hasSummary"], json!(false));
}

#[actix_web::test]
async fn test_list_calls_returns_count() {
    let app = test_app!(test_state());

    post_json(&app, "/api/calls", &call_payload()).await;
    let mut second = call_payload();
    second["phoneNumber"] = json!("+1-555-0101");
    second["timestamp"] = json!("2024-01-01T11:00:00.000Z");
    post_json(&app, "/api/calls", &second).await;

    let (status, body) = get_json(&app, "/api/calls").await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], json!(2));
    // Most recent first.
    assert_eq!(body["calls"][0]["phoneNumber"], json!("+1-555-0101"));
}

#[actix_web::test]
async fn test_malformed_json_body_is_rejected() {
    let app = test_app!(test_state());

    let req = test::TestRequest::post()
        .uri("/api/calls")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("Invalid JSON in request body"));
}

#[actix_web::test]
async fn test_missing_phone_number_rejected_first() {
    let app = test_app!(test_state());

    let mut payload = call_payload();
    payload.as_object_mut().unwrap().remove("phoneNumber");
    payload["type"] = json!("not-a-type");

    let (status, body) = post_json(&app, "/api/calls", &payload).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], json!("Missing required field: phoneNumber"));
}

#[actix_web::test]
async fn test_transcript_create_sets_call_flag() {
    let app = test_app!(test_state());

    let (_, body) = post_json(&app, "/api/calls", &call_payload()).await;
    let call_id = body["callId"].as_str().unwrap().to_string();

    let (status, body) = post_json(&app, "/api/transcripts", &transcript_payload(&call_id)).await;
    assert_eq!(status, 201);
    assert!(body["transcriptId"].is_string());

    let (_, body) = get_json(&app, &format!("/api/calls?callId={}", call_id)).await;
    assert_eq!(body["call"]["hasTranscript"], json!(true));
    assert_eq!(body["call"]["transcriptStatus"], json!("completed"));

    let (status, body) = get_json(&app, &format!("/api/transcripts?callId={}", call_id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["transcript"]["fullTranscript"], json!("user: hi"));
}

#[actix_web::test]
async fn test_duplicate_transcript_conflict_preserves_original() {
    let app = test_app!(test_state());

    let (_, body) = post_json(&app, "/api/calls", &call_payload()).await;
    let call_id = body["callId"].as_str().unwrap().to_string();

    let (status, _) = post_json(&app, "/api/transcripts", &transcript_payload(&call_id)).await;
    assert_eq!(status, 201);

    let mut second = transcript_payload(&call_id);
    second["transcript"] = json!([{ "role": "agent", "response": "replacement" }]);
    let (status, body) = post_json(&app, "/api/transcripts", &second).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], json!("Transcript already exists for this call"));

    let (_, body) = get_json(&app, &format!("/api/transcripts?callId={}", call_id)).await;
    assert_eq!(body["transcript"]["fullTranscript"], json!("user: hi"));
}

#[actix_web::test]
async fn test_transcript_for_unknown_call_is_404() {
    let app = test_app!(test_state());

    let (status, body) = post_json(&app, "/api/transcripts", &transcript_payload("missing")).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], json!("Call not found"));
}

#[actix_web::test]
async fn test_summary_with_empty_key_points_then_duplicate_conflict() {
    let app = test_app!(test_state());

    let (_, body) = post_json(&app, "/api/calls", &call_payload()).await;
    let call_id = body["callId"].as_str().unwrap().to_string();

    let (status, body) = post_json(&app, "/api/summaries", &summary_payload(&call_id)).await;
    assert_eq!(status, 201);
    assert!(body["summaryId"].is_string());

    let (status, body) = post_json(&app, "/api/summaries", &summary_payload(&call_id)).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], json!("Summary already exists for this call"));

    let (_, body) = get_json(&app, &format!("/api/calls?callId={}", call_id)).await;
    assert_eq!(body["call"]["hasSummary"], json!(true));
}

#[actix_web::test]
async fn test_delete_transcript_clears_flag() {
    let app = test_app!(test_state());

    let (_, body) = post_json(&app, "/api/calls", &call_payload()).await;
    let call_id = body["callId"].as_str().unwrap().to_string();
    post_json(&app, "/api/transcripts", &transcript_payload(&call_id)).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/transcripts?callId={}", call_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let (_, body) = get_json(&app, &format!("/api/calls?callId={}", call_id)).await;
    assert_eq!(body["call"]["hasTranscript"], json!(false));

    let (status, _) = get_json(&app, &format!("/api/transcripts?callId={}", call_id)).await;
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_call_details_bundles_related_records() {
    let app = test_app!(test_state());

    let (_, body) = post_json(&app, "/api/calls", &call_payload()).await;
    let call_id = body["callId"].as_str().unwrap().to_string();
    post_json(&app, "/api/transcripts", &transcript_payload(&call_id)).await;

    let (status, body) = get_json(&app, &format!("/api/calls/{}/details", call_id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["call"]["id"], json!(call_id));
    assert_eq!(body["transcript"]["callId"], json!(call_id));
    assert!(body["summary"].is_null());
}

#[actix_web::test]
async fn test_admin_reconcile_reports_repairs() {
    let state = test_state();
    let app = test_app!(state.clone());

    let (_, body) = post_json(&app, "/api/calls", &call_payload()).await;
    let call_id = body["callId"].as_str().unwrap().to_string();

    // Desync the flag directly in the store.
    state
        .db
        .update_call(
            &call_id,
            &crate::models::CallUpdate {
                has_transcript: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/admin/reconcile")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["report"]["corrected"], json!(1));

    let (_, body) = get_json(&app, &format!("/api/calls?callId={}", call_id)).await;
    assert_eq!(body["call"]["hasTranscript"], json!(false));
}

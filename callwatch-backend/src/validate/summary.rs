//! Validation for call-summary create/update payloads.

use serde_json::Value;

use super::{get, opt_bool, opt_str, require_str, str_array, ValidateFailure, ValidationError};
use crate::db::Database;
use crate::models::{CallIntent, NewCallSummary, Sentiment, SummaryUpdate, Urgency};

/// Check the nested intent object and normalize it.
fn parse_intent(value: &Value) -> Result<CallIntent, ValidationError> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Err(ValidationError::missing("intent")),
    };

    let primary = match obj.get("primary").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => {
            return Err(ValidationError::invalid(
                "intent",
                "Invalid intent: primary and confidence are required",
            ))
        }
    };
    let confidence = match obj.get("confidence").and_then(Value::as_f64) {
        Some(n) => n,
        None => {
            return Err(ValidationError::invalid(
                "intent",
                "Invalid intent: primary and confidence are required",
            ))
        }
    };

    let sentiment = obj
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::from_str)
        .ok_or_else(|| {
            ValidationError::invalid(
                "intent.sentiment",
                "Invalid intent sentiment: must be 'positive', 'negative', or 'neutral'",
            )
        })?;

    let urgency = obj
        .get("urgency")
        .and_then(Value::as_str)
        .and_then(Urgency::from_str)
        .ok_or_else(|| {
            ValidationError::invalid(
                "intent.urgency",
                "Invalid intent urgency: must be 'low', 'medium', or 'high'",
            )
        })?;

    let keywords = obj
        .get("keywords")
        .and_then(str_array)
        .ok_or_else(|| {
            ValidationError::invalid(
                "intent.keywords",
                "Invalid intent keywords: must be an array",
            )
        })?;

    Ok(CallIntent {
        primary,
        confidence,
        keywords,
        sentiment,
        urgency,
    })
}

fn parse_satisfaction_score(body: &Value) -> Result<Option<f64>, ValidationError> {
    match get(body, "satisfactionScore") {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) if (1.0..=10.0).contains(&n) => Ok(Some(n)),
            _ => Err(ValidationError::invalid(
                "satisfactionScore",
                "Invalid satisfactionScore: must be a number between 1 and 10",
            )),
        },
    }
}

fn parse_action_items(body: &Value) -> Result<Option<Vec<String>>, ValidationError> {
    match get(body, "actionItems") {
        None => Ok(None),
        Some(v) => str_array(v).map(Some).ok_or_else(|| {
            ValidationError::invalid("actionItems", "Invalid actionItems: must be an array")
        }),
    }
}

/// Validate a summary-creation payload in declaration order.
pub fn validate_new_summary(db: &Database, body: &Value) -> Result<NewCallSummary, ValidateFailure> {
    let call_id = require_str(body, "callId")?;
    let summary = require_str(body, "summary")?;

    let intent = match get(body, "intent") {
        Some(v) => parse_intent(v)?,
        None => return Err(ValidationError::missing("intent").into()),
    };

    let key_points = match get(body, "keyPoints") {
        Some(v) => str_array(v).ok_or_else(|| {
            ValidationError::invalid("keyPoints", "Invalid keyPoints: must be an array")
        })?,
        None => {
            return Err(
                ValidationError::invalid("keyPoints", "Invalid keyPoints: must be an array").into(),
            )
        }
    };

    let follow_up_required = match get(body, "followUpRequired").and_then(Value::as_bool) {
        Some(b) => b,
        None => {
            return Err(ValidationError::invalid(
                "followUpRequired",
                "Invalid followUpRequired: must be a boolean",
            )
            .into())
        }
    };

    let satisfaction_score = parse_satisfaction_score(body)?;
    let action_items = parse_action_items(body)?;

    if !db.call_exists(&call_id)? {
        return Err(ValidationError::NotFound { resource: "Call" }.into());
    }

    if db.call_has_summary(&call_id)? {
        return Err(ValidationError::Conflict {
            resource: "Summary",
        }
        .into());
    }

    let transcript_id = opt_str(body, "transcriptId")?;
    if let Some(id) = &transcript_id {
        let matches = db
            .get_transcript_by_call(&call_id)?
            .map(|t| t.id == *id)
            .unwrap_or(false);
        if !matches {
            return Err(ValidationError::invalid(
                "transcriptId",
                "Invalid transcriptId: transcript not found for this call",
            )
            .into());
        }
    }

    Ok(NewCallSummary {
        call_id,
        transcript_id,
        summary,
        intent,
        key_points,
        action_items,
        follow_up_required,
        satisfaction_score,
        ai_model: opt_str(body, "aiModel")?.unwrap_or_else(|| "external-service".to_string()),
    })
}

/// Validate a partial summary update; only present fields are checked.
pub fn validate_summary_update(
    db: &Database,
    body: &Value,
) -> Result<(String, SummaryUpdate), ValidateFailure> {
    let call_id = require_str(body, "callId")?;
    if !db.call_has_summary(&call_id)? {
        return Err(ValidationError::NotFound {
            resource: "Summary",
        }
        .into());
    }

    let mut update = SummaryUpdate::default();
    update.summary = opt_str(body, "summary")?;
    if let Some(v) = get(body, "intent") {
        update.intent = Some(parse_intent(v)?);
    }
    if let Some(v) = get(body, "keyPoints") {
        update.key_points = Some(str_array(v).ok_or_else(|| {
            ValidationError::invalid("keyPoints", "Invalid keyPoints: must be an array")
        })?);
    }
    update.action_items = parse_action_items(body)?;
    update.follow_up_required = opt_bool(body, "followUpRequired")?;
    update.satisfaction_score = parse_satisfaction_score(body)?;
    update.ai_model = opt_str(body, "aiModel")?;

    Ok((call_id, update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallStatus, CallType, NewCall};
    use serde_json::json;

    fn db_with_call() -> (Database, String) {
        let db = Database::new(":memory:").unwrap();
        let call_id = db
            .insert_call(&NewCall {
                phone_number: "+1-555-0100".into(),
                contact_id: None,
                call_type: CallType::Business,
                status: CallStatus::Allowed,
                duration: 300.0,
                timestamp: "2024-01-01T10:00:00.000Z".into(),
                is_spam: false,
                confidence: 2.0,
                location: None,
                carrier_info: None,
                action: None,
                notes: None,
                has_transcript: false,
                has_summary: false,
                transcript_status: None,
            })
            .unwrap();
        (db, call_id)
    }

    fn valid_payload(call_id: &str) -> Value {
        json!({
            "callId": call_id,
            "summary": "Customer asked about invoice 4471.",
            "intent": {
                "primary": "support",
                "confidence": 88,
                "keywords": ["invoice", "billing"],
                "sentiment": "neutral",
                "urgency": "medium"
            },
            "keyPoints": ["customer disputes line item"],
            "followUpRequired": true
        })
    }

    #[test]
    fn test_valid_summary_accepted_with_defaults() {
        let (db, call_id) = db_with_call();
        let summary = validate_new_summary(&db, &valid_payload(&call_id)).unwrap();
        assert_eq!(summary.ai_model, "external-service");
        assert!(summary.transcript_id.is_none());
        assert_eq!(summary.intent.keywords, vec!["invoice", "billing"]);
    }

    #[test]
    fn test_empty_key_points_accepted() {
        let (db, call_id) = db_with_call();
        let mut body = valid_payload(&call_id);
        body["keyPoints"] = json!([]);
        assert!(validate_new_summary(&db, &body).is_ok());
    }

    #[test]
    fn test_missing_summary_named() {
        let (db, call_id) = db_with_call();
        let mut body = valid_payload(&call_id);
        body.as_object_mut().unwrap().remove("summary");
        match validate_new_summary(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("summary")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_intent_without_confidence_rejected() {
        let (db, call_id) = db_with_call();
        let mut body = valid_payload(&call_id);
        body["intent"].as_object_mut().unwrap().remove("confidence");
        match validate_new_summary(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("intent")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bad_sentiment_rejected() {
        let (db, call_id) = db_with_call();
        let mut body = valid_payload(&call_id);
        body["intent"]["sentiment"] = json!("elated");
        match validate_new_summary(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("intent.sentiment")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_duplicate_summary_is_conflict() {
        let (db, call_id) = db_with_call();
        let summary = validate_new_summary(&db, &valid_payload(&call_id)).unwrap();
        db.insert_call_summary(&summary).unwrap();

        match validate_new_summary(&db, &valid_payload(&call_id)) {
            Err(ValidateFailure::Rejected(ValidationError::Conflict { resource })) => {
                assert_eq!(resource, "Summary")
            }
            other => panic!("expected Conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_transcript_id_must_belong_to_call() {
        let (db, call_id) = db_with_call();
        let mut body = valid_payload(&call_id);
        body["transcriptId"] = json!("someone-elses-transcript");
        match validate_new_summary(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("transcriptId")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_satisfaction_score_range() {
        let (db, call_id) = db_with_call();
        let mut body = valid_payload(&call_id);
        body["satisfactionScore"] = json!(11);
        match validate_new_summary(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => {
                assert_eq!(e.field(), Some("satisfactionScore"))
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_update_unknown_summary_not_found() {
        let (db, call_id) = db_with_call();
        let body = json!({"callId": call_id, "summary": "revised"});
        match validate_summary_update(&db, &body) {
            Err(ValidateFailure::Rejected(ValidationError::NotFound { resource })) => {
                assert_eq!(resource, "Summary")
            }
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }
}

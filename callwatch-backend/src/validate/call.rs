//! Validation for call create/update payloads.

use serde_json::Value;

use super::{get, opt_bool, opt_str, require_str, ValidateFailure, ValidationError};
use crate::db::Database;
use crate::models::{CallAction, CallStatus, CallType, CallUpdate, NewCall, TranscriptStatus};

fn parse_type(body: &Value) -> Result<CallType, ValidationError> {
    get(body, "type")
        .and_then(Value::as_str)
        .and_then(CallType::from_str)
        .ok_or_else(|| {
            ValidationError::invalid("type", "Invalid type: must be 'personal' or 'business'")
        })
}

fn parse_status(body: &Value) -> Result<CallStatus, ValidationError> {
    get(body, "status")
        .and_then(Value::as_str)
        .and_then(CallStatus::from_str)
        .ok_or_else(|| {
            ValidationError::invalid(
                "status",
                "Invalid status: must be 'allowed', 'blocked', 'spam', or 'unknown'",
            )
        })
}

fn parse_confidence(body: &Value) -> Result<f64, ValidationError> {
    match get(body, "confidence").and_then(Value::as_f64) {
        Some(n) if (0.0..=100.0).contains(&n) => Ok(n),
        _ => Err(ValidationError::invalid(
            "confidence",
            "Invalid confidence: must be a number between 0 and 100",
        )),
    }
}

fn parse_action(body: &Value) -> Result<Option<CallAction>, ValidationError> {
    match get(body, "action") {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .and_then(CallAction::from_str)
            .map(Some)
            .ok_or_else(|| {
                ValidationError::invalid(
                    "action",
                    "Invalid action: must be 'allow', 'block', 'mark_spam', or 'whitelist'",
                )
            }),
    }
}

fn parse_transcript_status(body: &Value) -> Result<Option<TranscriptStatus>, ValidationError> {
    match get(body, "transcriptStatus") {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .and_then(TranscriptStatus::from_str)
            .map(Some)
            .ok_or_else(|| {
                ValidationError::invalid(
                    "transcriptStatus",
                    "Invalid transcriptStatus: must be 'pending', 'processing', 'completed', or 'failed'",
                )
            }),
    }
}

/// Validate a call-creation payload. Check order is significant: the first
/// violated field, in declaration order, names the rejection.
pub fn validate_new_call(db: &Database, body: &Value) -> Result<NewCall, ValidateFailure> {
    let phone_number = require_str(body, "phoneNumber")?;
    let call_type = parse_type(body)?;
    let status = parse_status(body)?;

    let duration = match get(body, "duration").and_then(Value::as_f64) {
        Some(n) if n >= 0.0 => n,
        _ => {
            return Err(ValidationError::invalid(
                "duration",
                "Invalid duration: must be a non-negative number",
            )
            .into())
        }
    };

    let timestamp = require_str(body, "timestamp")?;
    if chrono::DateTime::parse_from_rfc3339(&timestamp).is_err() {
        return Err(ValidationError::invalid("timestamp", "Invalid timestamp format").into());
    }

    let is_spam = match get(body, "isSpam").and_then(Value::as_bool) {
        Some(b) => b,
        None => {
            return Err(
                ValidationError::invalid("isSpam", "Invalid isSpam: must be a boolean").into(),
            )
        }
    };

    let confidence = parse_confidence(body)?;

    let contact_id = opt_str(body, "contactId")?;
    if let Some(id) = &contact_id {
        if !db.contact_exists(id)? {
            return Err(
                ValidationError::invalid("contactId", "Invalid contactId: contact not found")
                    .into(),
            );
        }
    }

    let action = parse_action(body)?;
    let transcript_status = parse_transcript_status(body)?;

    Ok(NewCall {
        phone_number,
        contact_id,
        call_type,
        status,
        duration,
        timestamp,
        is_spam,
        confidence,
        location: opt_str(body, "location")?,
        carrier_info: opt_str(body, "carrierInfo")?,
        action,
        notes: opt_str(body, "notes")?,
        has_transcript: get(body, "hasTranscript")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        has_summary: get(body, "hasSummary")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        transcript_status,
    })
}

/// Validate a partial call update. Only fields present in the payload are
/// checked; absent fields are left untouched on the stored record.
pub fn validate_call_update(
    db: &Database,
    body: &Value,
) -> Result<(String, CallUpdate), ValidateFailure> {
    let call_id = require_str(body, "callId")?;
    if !db.call_exists(&call_id)? {
        return Err(ValidationError::NotFound { resource: "Call" }.into());
    }

    let mut update = CallUpdate::default();

    if get(body, "type").is_some() {
        update.call_type = Some(parse_type(body)?);
    }
    if get(body, "status").is_some() {
        update.status = Some(parse_status(body)?);
    }
    if get(body, "confidence").is_some() {
        update.confidence = Some(parse_confidence(body)?);
    }
    update.is_spam = opt_bool(body, "isSpam")?;
    update.action = parse_action(body)?;
    update.notes = opt_str(body, "notes")?;
    update.location = opt_str(body, "location")?;
    update.carrier_info = opt_str(body, "carrierInfo")?;
    update.has_transcript = opt_bool(body, "hasTranscript")?;
    update.has_summary = opt_bool(body, "hasSummary")?;
    update.transcript_status = parse_transcript_status(body)?;

    Ok((call_id, update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> Database {
        Database::new(":memory:").unwrap()
    }

    fn valid_payload() -> Value {
        json!({
            "phoneNumber": "+1-555-0100",
            "type": "personal",
            "status": "allowed",
            "duration": 120,
            "timestamp": "2024-01-01T10:00:00.000Z",
            "isSpam": false,
            "confidence": 5
        })
    }

    fn rejected_field(result: Result<NewCall, ValidateFailure>) -> &'static str {
        match result {
            Err(ValidateFailure::Rejected(e)) => e.field().expect("expected Invalid"),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_valid_payload_accepted_with_default_flags() {
        let call = validate_new_call(&db(), &valid_payload()).unwrap();
        assert_eq!(call.phone_number, "+1-555-0100");
        assert!(!call.has_transcript);
        assert!(!call.has_summary);
        assert!(call.transcript_status.is_none());
    }

    #[test]
    fn test_missing_phone_number_named_first() {
        // Everything else is also wrong; phoneNumber must still win.
        let body = json!({
            "type": "bogus",
            "status": 42,
            "duration": -5,
            "confidence": 900
        });
        assert_eq!(rejected_field(validate_new_call(&db(), &body)), "phoneNumber");
    }

    #[test]
    fn test_field_order_type_before_status() {
        let mut body = valid_payload();
        body["type"] = json!("household");
        body["status"] = json!("nope");
        assert_eq!(rejected_field(validate_new_call(&db(), &body)), "type");
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut body = valid_payload();
        body["duration"] = json!(-1);
        assert_eq!(rejected_field(validate_new_call(&db(), &body)), "duration");
    }

    #[test]
    fn test_unparseable_timestamp_rejected() {
        let mut body = valid_payload();
        body["timestamp"] = json!("last tuesday");
        assert_eq!(rejected_field(validate_new_call(&db(), &body)), "timestamp");
    }

    #[test]
    fn test_confidence_boundaries_inclusive() {
        for value in [0, 100] {
            let mut body = valid_payload();
            body["confidence"] = json!(value);
            assert!(validate_new_call(&db(), &body).is_ok(), "confidence {}", value);
        }
        for value in [-1, 101] {
            let mut body = valid_payload();
            body["confidence"] = json!(value);
            assert_eq!(rejected_field(validate_new_call(&db(), &body)), "confidence");
        }
    }

    #[test]
    fn test_unknown_contact_id_rejected_as_invalid() {
        let mut body = valid_payload();
        body["contactId"] = json!("no-such-contact");
        let err = match validate_new_call(&db(), &body) {
            Err(ValidateFailure::Rejected(e)) => e,
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        };
        // Bad reference is a 400-class Invalid, not a 404.
        assert_eq!(err.field(), Some("contactId"));
    }

    #[test]
    fn test_known_contact_id_accepted() {
        let db = db();
        let contact_id = db
            .insert_contact(&crate::models::NewContact {
                phone_number: "+1-555-0100".into(),
                name: Some("Dana".into()),
                contact_type: CallType::Personal,
                is_whitelisted: false,
                is_blocked: false,
                notes: None,
            })
            .unwrap();

        let mut body = valid_payload();
        body["contactId"] = json!(contact_id);
        let call = validate_new_call(&db, &body).unwrap();
        assert_eq!(call.contact_id.as_deref(), Some(contact_id.as_str()));
    }

    #[test]
    fn test_bad_action_rejected() {
        let mut body = valid_payload();
        body["action"] = json!("obliterate");
        assert_eq!(rejected_field(validate_new_call(&db(), &body)), "action");
    }

    #[test]
    fn test_update_unknown_call_is_not_found() {
        let body = json!({"callId": "missing", "status": "blocked"});
        match validate_call_update(&db(), &body) {
            Err(ValidateFailure::Rejected(ValidationError::NotFound { resource })) => {
                assert_eq!(resource, "Call")
            }
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        let db = db();
        let call = validate_new_call(&db, &valid_payload()).unwrap();
        let id = db.insert_call(&call).unwrap();

        let body = json!({"callId": id, "status": "blocked"});
        let (_, update) = validate_call_update(&db, &body).unwrap();
        assert_eq!(update.status, Some(CallStatus::Blocked));
        assert!(update.call_type.is_none());
        assert!(update.confidence.is_none());
    }

    #[test]
    fn test_update_rejects_out_of_range_confidence() {
        let db = db();
        let call = validate_new_call(&db, &valid_payload()).unwrap();
        let id = db.insert_call(&call).unwrap();

        let body = json!({"callId": id, "confidence": 101});
        match validate_call_update(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("confidence")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }
}

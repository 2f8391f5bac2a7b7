//! Validation for transcript create/update payloads.

use chrono::Utc;
use serde_json::Value;

use super::{get, opt_f64, opt_str, require_str, ValidateFailure, ValidationError};
use crate::db::Database;
use crate::models::{join_messages, NewTranscript, SpeakerRole, TranscriptMessage, TranscriptUpdate};

/// Check and normalize the `transcript` message array.
fn parse_messages(body: &Value) -> Result<Vec<TranscriptMessage>, ValidationError> {
    let items = match get(body, "transcript").and_then(Value::as_array) {
        Some(items) => items,
        None => {
            return Err(ValidationError::invalid(
                "transcript",
                "Missing or invalid transcript array",
            ))
        }
    };
    if items.is_empty() {
        return Err(ValidationError::invalid(
            "transcript",
            "transcript must contain at least one message",
        ));
    }

    let mut messages = Vec::with_capacity(items.len());
    for item in items {
        let role = match item.get("role").and_then(Value::as_str).and_then(SpeakerRole::from_str) {
            Some(role) => role,
            None => {
                return Err(ValidationError::invalid(
                    "transcript",
                    "Invalid transcript message: role must be 'agent' or 'user'",
                ))
            }
        };
        let response = match item.get("response").and_then(Value::as_str) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                return Err(ValidationError::invalid(
                    "transcript",
                    "Invalid transcript message: response is required",
                ))
            }
        };
        messages.push(TranscriptMessage {
            role,
            response,
            timestamp: item
                .get("timestamp")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            confidence: item.get("confidence").and_then(Value::as_f64),
        });
    }
    Ok(messages)
}

/// Validate a transcript-creation payload. On success the record is fully
/// normalized: derived fullTranscript, default language, and the parent
/// call's duration where none was supplied.
pub fn validate_new_transcript(
    db: &Database,
    body: &Value,
) -> Result<NewTranscript, ValidateFailure> {
    let call_id = require_str(body, "callId")?;
    let messages = parse_messages(body)?;

    let call = match db.get_call(&call_id)? {
        Some(call) => call,
        None => return Err(ValidationError::NotFound { resource: "Call" }.into()),
    };

    if db.call_has_transcript(&call_id)? {
        return Err(ValidationError::Conflict {
            resource: "Transcript",
        }
        .into());
    }

    let full_transcript = match opt_str(body, "fullTranscript")? {
        Some(full) => full,
        None => join_messages(&messages),
    };

    Ok(NewTranscript {
        call_id,
        full_transcript,
        language: opt_str(body, "language")?.unwrap_or_else(|| "en".to_string()),
        duration: opt_f64(body, "duration")?.unwrap_or(call.duration),
        created_at: opt_str(body, "createdAt")?.unwrap_or_else(|| Utc::now().to_rfc3339()),
        messages,
    })
}

/// Validate a transcript update. A replaced message array must pass the
/// same checks as on creation.
pub fn validate_transcript_update(
    db: &Database,
    body: &Value,
) -> Result<(String, TranscriptUpdate), ValidateFailure> {
    let call_id = require_str(body, "callId")?;
    if !db.call_has_transcript(&call_id)? {
        return Err(ValidationError::NotFound {
            resource: "Transcript",
        }
        .into());
    }

    let mut update = TranscriptUpdate::default();
    if get(body, "transcript").is_some() {
        update.messages = Some(parse_messages(body)?);
    }
    update.full_transcript = opt_str(body, "fullTranscript")?;
    update.language = opt_str(body, "language")?;
    update.duration = opt_f64(body, "duration")?;

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
                call_type: CallType::Personal,
                status: CallStatus::Allowed,
                duration: 120.0,
                timestamp: "2024-01-01T10:00:00.000Z".into(),
                is_spam: false,
                confidence: 5.0,
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

    #[test]
    fn test_full_transcript_derived_from_messages() {
        let (db, call_id) = db_with_call();
        let body = json!({
            "callId": call_id,
            "transcript": [{"role": "user", "response": "hi"}]
        });
        let transcript = validate_new_transcript(&db, &body).unwrap();
        assert_eq!(transcript.full_transcript, "user: hi");
        assert_eq!(transcript.language, "en");
        // Defaults to the parent call's duration.
        assert_eq!(transcript.duration, 120.0);
    }

    #[test]
    fn test_explicit_full_transcript_kept() {
        let (db, call_id) = db_with_call();
        let body = json!({
            "callId": call_id,
            "transcript": [{"role": "user", "response": "hi"}],
            "fullTranscript": "caller said hi"
        });
        let transcript = validate_new_transcript(&db, &body).unwrap();
        assert_eq!(transcript.full_transcript, "caller said hi");
    }

    #[test]
    fn test_empty_transcript_array_rejected() {
        let (db, call_id) = db_with_call();
        let body = json!({"callId": call_id, "transcript": []});
        match validate_new_transcript(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("transcript")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bad_role_rejected() {
        let (db, call_id) = db_with_call();
        let body = json!({
            "callId": call_id,
            "transcript": [{"role": "narrator", "response": "hi"}]
        });
        match validate_new_transcript(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => {
                assert!(e.message().contains("role must be 'agent' or 'user'"))
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_call_is_not_found() {
        let db = Database::new(":memory:").unwrap();
        let body = json!({
            "callId": "missing",
            "transcript": [{"role": "user", "response": "hi"}]
        });
        match validate_new_transcript(&db, &body) {
            Err(ValidateFailure::Rejected(ValidationError::NotFound { resource })) => {
                assert_eq!(resource, "Call")
            }
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_second_transcript_is_conflict() {
        let (db, call_id) = db_with_call();
        let body = json!({
            "callId": call_id,
            "transcript": [{"role": "user", "response": "hi"}]
        });
        let first = validate_new_transcript(&db, &body).unwrap();
        db.insert_transcript(&first).unwrap();

        match validate_new_transcript(&db, &body) {
            Err(ValidateFailure::Rejected(ValidationError::Conflict { resource })) => {
                assert_eq!(resource, "Transcript")
            }
            other => panic!("expected Conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_update_recomputes_full_transcript() {
        let (db, call_id) = db_with_call();
        let create = json!({
            "callId": call_id,
            "transcript": [{"role": "user", "response": "hi"}]
        });
        let transcript = validate_new_transcript(&db, &create).unwrap();
        db.insert_transcript(&transcript).unwrap();

        let update = json!({
            "callId": call_id,
            "transcript": [
                {"role": "agent", "response": "Hello"},
                {"role": "user", "response": "Goodbye"}
            ]
        });
        let (id, update) = validate_transcript_update(&db, &update).unwrap();
        let stored = db.update_transcript(&id, &update).unwrap().unwrap();
        assert_eq!(stored.full_transcript, "agent: Hello\nuser: Goodbye");
        assert_eq!(stored.transcript.len(), 2);
    }
}

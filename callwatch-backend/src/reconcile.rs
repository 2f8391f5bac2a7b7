//! Keeps the denormalized call flags consistent with table truth.
//!
//! `hasTranscript`/`hasSummary` exist so list views render without a join
//! per row; they are a cache whose sole authority is "does a row exist in
//! the related table". The creation and deletion endpoints each set the
//! flag on their own call, and this sweep is the backstop that repairs any
//! write path that skipped the flag update.

use serde::Serialize;

use crate::db::Database;
use crate::models::TranscriptStatus;

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReconcileReport {
    /// Calls scanned.
    pub examined: usize,
    /// Calls whose flags were patched.
    pub corrected: usize,
    /// Calls that could not be examined or patched; logged and skipped.
    pub failed: usize,
}

/// Scan every call, recompute flag truth from the transcripts and
/// call_summaries tables, and patch any call whose stored flags disagree.
///
/// Idempotent: a second run with no intervening writes corrects nothing.
/// Not transactional across calls; a failure on one call is tallied and
/// the scan continues, and partial completion is safe to re-run.
pub fn reconcile_call_flags(db: &Database) -> Result<ReconcileReport, rusqlite::Error> {
    let calls = db.list_call_flag_rows()?;
    let mut report = ReconcileReport {
        examined: calls.len(),
        ..Default::default()
    };

    for call in calls {
        let outcome = (|| -> Result<bool, rusqlite::Error> {
            let has_transcript = db.call_has_transcript(&call.id)?;
            let has_summary = db.call_has_summary(&call.id)?;

            if call.has_transcript == has_transcript && call.has_summary == has_summary {
                return Ok(false);
            }

            let transcript_status = if has_transcript {
                Some(TranscriptStatus::Completed)
            } else {
                None
            };
            db.set_call_flags(&call.id, has_transcript, has_summary, transcript_status)?;
            Ok(true)
        })();

        match outcome {
            Ok(true) => report.corrected += 1,
            Ok(false) => {}
            Err(e) => {
                log::warn!("Flag reconciliation failed for call {}: {}", call.id, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallStatus, CallType, NewCall, NewTranscript, TranscriptMessage};
    use crate::models::{CallUpdate, SpeakerRole};

    fn new_call(phone: &str) -> NewCall {
        NewCall {
            phone_number: phone.into(),
            contact_id: None,
            call_type: CallType::Personal,
            status: CallStatus::Allowed,
            duration: 60.0,
            timestamp: "2024-01-01T10:00:00.000Z".into(),
            is_spam: false,
            confidence: 1.0,
            location: None,
            carrier_info: None,
            action: None,
            notes: None,
            has_transcript: false,
            has_summary: false,
            transcript_status: None,
        }
    }

    fn transcript_for(call_id: &str) -> NewTranscript {
        NewTranscript {
            call_id: call_id.into(),
            messages: vec![TranscriptMessage {
                role: SpeakerRole::User,
                response: "hi".into(),
                timestamp: None,
                confidence: None,
            }],
            full_transcript: "user: hi".into(),
            language: "en".into(),
            duration: 60.0,
            created_at: "2024-01-01T10:05:00.000Z".into(),
        }
    }

    #[test]
    fn test_repairs_stale_flag_and_sets_completed_status() {
        let db = Database::new(":memory:").unwrap();
        let call_id = db.insert_call(&new_call("+1-555-0100")).unwrap();
        // Transcript row inserted without the flag side effect.
        db.insert_transcript(&transcript_for(&call_id)).unwrap();

        let report = reconcile_call_flags(&db).unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.corrected, 1);
        assert_eq!(report.failed, 0);

        let call = db.get_call(&call_id).unwrap().unwrap();
        assert!(call.has_transcript);
        assert!(!call.has_summary);
        assert_eq!(call.transcript_status, Some(TranscriptStatus::Completed));
    }

    #[test]
    fn test_clears_flag_with_no_backing_row() {
        let db = Database::new(":memory:").unwrap();
        let call_id = db.insert_call(&new_call("+1-555-0100")).unwrap();
        db.update_call(
            &call_id,
            &CallUpdate {
                has_transcript: Some(true),
                has_summary: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let report = reconcile_call_flags(&db).unwrap();
        assert_eq!(report.corrected, 1);

        let call = db.get_call(&call_id).unwrap().unwrap();
        assert!(!call.has_transcript);
        assert!(!call.has_summary);
        assert!(call.transcript_status.is_none());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let db = Database::new(":memory:").unwrap();
        let with_transcript = db.insert_call(&new_call("+1-555-0100")).unwrap();
        db.insert_transcript(&transcript_for(&with_transcript))
            .unwrap();
        db.insert_call(&new_call("+1-555-0101")).unwrap();

        let first = reconcile_call_flags(&db).unwrap();
        assert_eq!(first.examined, 2);
        assert_eq!(first.corrected, 1);

        let second = reconcile_call_flags(&db).unwrap();
        assert_eq!(second.examined, 2);
        assert_eq!(second.corrected, 0);
        assert_eq!(second.failed, 0);
    }

    #[test]
    fn test_consistent_calls_untouched() {
        let db = Database::new(":memory:").unwrap();
        let call_id = db.insert_call(&new_call("+1-555-0100")).unwrap();
        db.insert_transcript(&transcript_for(&call_id)).unwrap();
        db.mark_call_transcribed(&call_id).unwrap();

        let report = reconcile_call_flags(&db).unwrap();
        assert_eq!(report.corrected, 0);
    }
}

//! Validation for insight-creation payloads.

use serde_json::Value;

use super::{get, require_str, ValidateFailure, ValidationError};
use crate::models::{InsightType, NewInsight};

pub fn validate_new_insight(body: &Value) -> Result<NewInsight, ValidateFailure> {
    let insight_type = get(body, "type")
        .and_then(Value::as_str)
        .and_then(InsightType::from_str)
        .ok_or_else(|| {
            ValidationError::invalid(
                "type",
                "Invalid type: must be 'warning', 'info', 'success', or 'recommendation'",
            )
        })?;

    let message = require_str(body, "message")?;

    let confidence = match get(body, "confidence").and_then(Value::as_f64) {
        Some(n) if (0.0..=100.0).contains(&n) => n,
        _ => {
            return Err(ValidationError::invalid(
                "confidence",
                "Invalid confidence: must be a number between 0 and 100",
            )
            .into())
        }
    };

    let actionable = match get(body, "actionable").and_then(Value::as_bool) {
        Some(b) => b,
        None => {
            return Err(ValidationError::invalid(
                "actionable",
                "Invalid actionable: must be a boolean",
            )
            .into())
        }
    };

    Ok(NewInsight {
        insight_type,
        message,
        confidence,
        actionable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_insight_accepted() {
        let body = json!({
            "type": "warning",
            "message": "Spam volume up 40% this week",
            "confidence": 72,
            "actionable": true
        });
        let insight = validate_new_insight(&body).unwrap();
        assert_eq!(insight.insight_type, InsightType::Warning);
    }

    #[test]
    fn test_bad_type_rejected() {
        let body = json!({
            "type": "gossip",
            "message": "x",
            "confidence": 10,
            "actionable": false
        });
        match validate_new_insight(&body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("type")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }
}

//! Validation for spam-rule create/update payloads.

use serde_json::Value;

use super::{get, opt_bool, opt_str, require_str, ValidateFailure, ValidationError};
use crate::db::Database;
use crate::models::{NewSpamRule, SpamRuleUpdate};

fn check_confidence(value: &Value) -> Result<f64, ValidationError> {
    match value.as_f64() {
        Some(n) if (0.0..=100.0).contains(&n) => Ok(n),
        _ => Err(ValidationError::invalid(
            "confidence",
            "Invalid confidence: must be a number between 0 and 100",
        )),
    }
}

pub fn validate_new_spam_rule(body: &Value) -> Result<NewSpamRule, ValidateFailure> {
    let name = require_str(body, "name")?;
    let pattern = require_str(body, "pattern")?;

    let is_active = match get(body, "isActive").and_then(Value::as_bool) {
        Some(b) => b,
        None => {
            return Err(
                ValidationError::invalid("isActive", "Invalid isActive: must be a boolean").into(),
            )
        }
    };

    let confidence = match get(body, "confidence") {
        Some(v) => check_confidence(v)?,
        None => return Err(ValidationError::missing("confidence").into()),
    };

    let description = require_str(body, "description")?;

    Ok(NewSpamRule {
        name,
        pattern,
        is_active,
        confidence,
        description,
    })
}

pub fn validate_spam_rule_update(
    db: &Database,
    body: &Value,
) -> Result<(String, SpamRuleUpdate), ValidateFailure> {
    let rule_id = require_str(body, "ruleId")?;
    if db.get_spam_rule(&rule_id)?.is_none() {
        return Err(ValidationError::NotFound {
            resource: "Spam rule",
        }
        .into());
    }

    let mut update = SpamRuleUpdate::default();
    update.name = opt_str(body, "name")?;
    update.pattern = opt_str(body, "pattern")?;
    update.is_active = opt_bool(body, "isActive")?;
    if let Some(v) = get(body, "confidence") {
        update.confidence = Some(check_confidence(v)?);
    }
    update.description = opt_str(body, "description")?;

    Ok((rule_id, update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_rule_accepted() {
        let body = json!({
            "name": "Robocall prefix",
            "pattern": "^\\+1-800",
            "isActive": true,
            "confidence": 85,
            "description": "Known robocall number block"
        });
        let rule = validate_new_spam_rule(&body).unwrap();
        assert!(rule.is_active);
        assert_eq!(rule.confidence, 85.0);
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let body = json!({
            "name": "Robocall prefix",
            "pattern": "^\\+1-800",
            "isActive": true,
            "confidence": 101,
            "description": "Known robocall number block"
        });
        match validate_new_spam_rule(&body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("confidence")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }
}

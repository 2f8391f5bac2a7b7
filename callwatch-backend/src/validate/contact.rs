//! Validation for contact create/update payloads.

use serde_json::Value;

use super::{get, opt_bool, opt_str, require_str, ValidateFailure, ValidationError};
use crate::db::Database;
use crate::models::{CallType, ContactUpdate, NewContact};

/// Validate a contact-creation payload. Whitelist and block flags are
/// mutually exclusive at the boundary.
pub fn validate_new_contact(body: &Value) -> Result<NewContact, ValidateFailure> {
    let phone_number = require_str(body, "phoneNumber")?;

    let contact_type = get(body, "type")
        .and_then(Value::as_str)
        .and_then(CallType::from_str)
        .ok_or_else(|| {
            ValidationError::invalid("type", "Invalid type: must be 'personal' or 'business'")
        })?;

    let is_whitelisted = opt_bool(body, "isWhitelisted")?.unwrap_or(false);
    let is_blocked = opt_bool(body, "isBlocked")?.unwrap_or(false);
    if is_whitelisted && is_blocked {
        return Err(ValidationError::invalid(
            "isBlocked",
            "Invalid isBlocked: contact cannot be both whitelisted and blocked",
        )
        .into());
    }

    Ok(NewContact {
        phone_number,
        name: opt_str(body, "name")?,
        contact_type,
        is_whitelisted,
        is_blocked,
        notes: opt_str(body, "notes")?,
    })
}

/// Validate a partial contact update. The exclusivity check runs against
/// the effective post-update state, not just the payload.
pub fn validate_contact_update(
    db: &Database,
    body: &Value,
) -> Result<(String, ContactUpdate), ValidateFailure> {
    let contact_id = require_str(body, "contactId")?;
    let existing = match db.get_contact(&contact_id)? {
        Some(contact) => contact,
        None => {
            return Err(ValidationError::NotFound {
                resource: "Contact",
            }
            .into())
        }
    };

    let update = ContactUpdate {
        name: opt_str(body, "name")?,
        is_whitelisted: opt_bool(body, "isWhitelisted")?,
        is_blocked: opt_bool(body, "isBlocked")?,
        notes: opt_str(body, "notes")?,
    };

    let whitelisted = update.is_whitelisted.unwrap_or(existing.is_whitelisted);
    let blocked = update.is_blocked.unwrap_or(existing.is_blocked);
    if whitelisted && blocked {
        return Err(ValidationError::invalid(
            "isBlocked",
            "Invalid isBlocked: contact cannot be both whitelisted and blocked",
        )
        .into());
    }

    Ok((contact_id, update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_contact_accepted() {
        let body = json!({"phoneNumber": "+1-555-0199", "type": "business", "name": "Acme"});
        let contact = validate_new_contact(&body).unwrap();
        assert_eq!(contact.contact_type, CallType::Business);
        assert!(!contact.is_whitelisted);
        assert!(!contact.is_blocked);
    }

    #[test]
    fn test_whitelisted_and_blocked_rejected() {
        let body = json!({
            "phoneNumber": "+1-555-0199",
            "type": "personal",
            "isWhitelisted": true,
            "isBlocked": true
        });
        match validate_new_contact(&body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("isBlocked")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_update_exclusivity_against_stored_state() {
        let db = Database::new(":memory:").unwrap();
        let id = db
            .insert_contact(&NewContact {
                phone_number: "+1-555-0199".into(),
                name: None,
                contact_type: CallType::Personal,
                is_whitelisted: true,
                is_blocked: false,
                notes: None,
            })
            .unwrap();

        // Blocking an already-whitelisted contact without clearing the
        // whitelist flag must be rejected.
        let body = json!({"contactId": id, "isBlocked": true});
        match validate_contact_update(&db, &body) {
            Err(ValidateFailure::Rejected(e)) => assert_eq!(e.field(), Some("isBlocked")),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }

        // Flipping both in one request is fine.
        let body = json!({"contactId": id, "isWhitelisted": false, "isBlocked": true});
        assert!(validate_contact_update(&db, &body).is_ok());
    }
}

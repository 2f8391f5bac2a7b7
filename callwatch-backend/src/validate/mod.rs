//! Payload validation for the ingestion endpoints.
//!
//! Validators take the raw JSON body (already parsed into a
//! `serde_json::Value`) and check fields in declaration order, failing on
//! the first violation so a malformed request always names one offending
//! field. The only side effects are read-only lookups for referential
//! checks (contact/call/transcript existence).

use serde_json::Value;

mod call;
mod contact;
mod insight;
mod spam_rule;
mod summary;
mod transcript;

pub use call::{validate_call_update, validate_new_call};
pub use contact::{validate_contact_update, validate_new_contact};
pub use insight::validate_new_insight;
pub use spam_rule::{validate_new_spam_rule, validate_spam_rule_update};
pub use summary::{validate_new_summary, validate_summary_update};
pub use transcript::{validate_new_transcript, validate_transcript_update};

/// A first-failure validation outcome, carrying the offending field and a
/// human-readable reason. The variant determines the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Shape, enum, or range violation; also malformed references like a
    /// bad contactId (400).
    Invalid { field: &'static str, reason: String },
    /// The primary resource the request addresses does not exist (404).
    NotFound { resource: &'static str },
    /// A second transcript/summary for a call that already has one (409).
    Conflict { resource: &'static str },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        ValidationError::Invalid {
            field,
            reason: format!("Missing required field: {}", field),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ValidationError::Invalid { reason, .. } => reason.clone(),
            ValidationError::NotFound { resource } => format!("{} not found", resource),
            ValidationError::Conflict { resource } => {
                format!("{} already exists for this call", resource)
            }
        }
    }

    /// The field the check tripped on, for `Invalid` rejections.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// A validator outcome: either a structured rejection or an underlying
/// store error (surfaced as HTTP 500 by the controllers).
#[derive(Debug)]
pub enum ValidateFailure {
    Rejected(ValidationError),
    Db(rusqlite::Error),
}

impl From<ValidationError> for ValidateFailure {
    fn from(e: ValidationError) -> Self {
        ValidateFailure::Rejected(e)
    }
}

impl From<rusqlite::Error> for ValidateFailure {
    fn from(e: rusqlite::Error) -> Self {
        ValidateFailure::Db(e)
    }
}

/// Field access treating JSON `null` the same as an absent key.
pub(crate) fn get<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    match body.get(key) {
        Some(Value::Null) | None => None,
        Some(v) => Some(v),
    }
}

/// A required, non-empty string field.
pub(crate) fn require_str(body: &Value, field: &'static str) -> Result<String, ValidationError> {
    match get(body, field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ValidationError::missing(field)),
    }
}

/// An optional string field; empty strings count as absent.
pub(crate) fn opt_str(body: &Value, field: &'static str) -> Result<Option<String>, ValidationError> {
    match get(body, field) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::invalid(
            field,
            format!("Invalid {}: must be a string", field),
        )),
    }
}

pub(crate) fn opt_bool(body: &Value, field: &'static str) -> Result<Option<bool>, ValidationError> {
    match get(body, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::invalid(
            field,
            format!("Invalid {}: must be a boolean", field),
        )),
    }
}

pub(crate) fn opt_f64(body: &Value, field: &'static str) -> Result<Option<f64>, ValidationError> {
    match get(body, field) {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) => Ok(Some(n)),
            None => Err(ValidationError::invalid(
                field,
                format!("Invalid {}: must be a number", field),
            )),
        },
    }
}

/// An array whose elements must all be strings.
pub(crate) fn str_array(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

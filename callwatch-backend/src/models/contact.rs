use serde::{Deserialize, Serialize};

use super::call::CallType;

/// A phone number's identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: CallType,
    pub is_whitelisted: bool,
    pub is_blocked: bool,
    pub call_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_call_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub phone_number: String,
    pub name: Option<String>,
    pub contact_type: CallType,
    pub is_whitelisted: bool,
    pub is_blocked: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub is_whitelisted: Option<bool>,
    pub is_blocked: Option<bool>,
    pub notes: Option<String>,
}

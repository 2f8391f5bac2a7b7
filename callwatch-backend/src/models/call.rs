use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Personal,
    Business,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Personal => "personal",
            CallType::Business => "business",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(CallType::Personal),
            "business" => Some(CallType::Business),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Allowed,
    Blocked,
    Spam,
    Unknown,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Allowed => "allowed",
            CallStatus::Blocked => "blocked",
            CallStatus::Spam => "spam",
            CallStatus::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "allowed" => Some(CallStatus::Allowed),
            "blocked" => Some(CallStatus::Blocked),
            "spam" => Some(CallStatus::Spam),
            "unknown" => Some(CallStatus::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallAction {
    Allow,
    Block,
    MarkSpam,
    Whitelist,
}

impl CallAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallAction::Allow => "allow",
            CallAction::Block => "block",
            CallAction::MarkSpam => "mark_spam",
            CallAction::Whitelist => "whitelist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "allow" => Some(CallAction::Allow),
            "block" => Some(CallAction::Block),
            "mark_spam" => Some(CallAction::MarkSpam),
            "whitelist" => Some(CallAction::Whitelist),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TranscriptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptStatus::Pending => "pending",
            TranscriptStatus::Processing => "processing",
            TranscriptStatus::Completed => "completed",
            TranscriptStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TranscriptStatus::Pending),
            "processing" => Some(TranscriptStatus::Processing),
            "completed" => Some(TranscriptStatus::Completed),
            "failed" => Some(TranscriptStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored call record, serialized with the public API field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub status: CallStatus,
    pub duration: f64,
    pub timestamp: String,
    pub is_spam: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CallAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub has_transcript: bool,
    pub has_summary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_status: Option<TranscriptStatus>,
}

/// A validated call payload, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCall {
    pub phone_number: String,
    pub contact_id: Option<String>,
    pub call_type: CallType,
    pub status: CallStatus,
    pub duration: f64,
    pub timestamp: String,
    pub is_spam: bool,
    pub confidence: f64,
    pub location: Option<String>,
    pub carrier_info: Option<String>,
    pub action: Option<CallAction>,
    pub notes: Option<String>,
    pub has_transcript: bool,
    pub has_summary: bool,
    pub transcript_status: Option<TranscriptStatus>,
}

/// Partial update for a call; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CallUpdate {
    pub call_type: Option<CallType>,
    pub status: Option<CallStatus>,
    pub is_spam: Option<bool>,
    pub confidence: Option<f64>,
    pub action: Option<CallAction>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub carrier_info: Option<String>,
    pub has_transcript: Option<bool>,
    pub has_summary: Option<bool>,
    pub transcript_status: Option<TranscriptStatus>,
}

impl CallUpdate {
    pub fn is_empty(&self) -> bool {
        self.call_type.is_none()
            && self.status.is_none()
            && self.is_spam.is_none()
            && self.confidence.is_none()
            && self.action.is_none()
            && self.notes.is_none()
            && self.location.is_none()
            && self.carrier_info.is_none()
            && self.has_transcript.is_none()
            && self.has_summary.is_none()
            && self.transcript_status.is_none()
    }
}

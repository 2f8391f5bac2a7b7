use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    Agent,
    User,
}

impl SpeakerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerRole::Agent => "agent",
            SpeakerRole::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "agent" => Some(SpeakerRole::Agent),
            "user" => Some(SpeakerRole::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One utterance in a call transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: SpeakerRole,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// The speech-to-text record for exactly one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: String,
    pub call_id: String,
    pub transcript: Vec<TranscriptMessage>,
    pub full_transcript: String,
    pub language: String,
    pub duration: f64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTranscript {
    pub call_id: String,
    pub messages: Vec<TranscriptMessage>,
    pub full_transcript: String,
    pub language: String,
    pub duration: f64,
    pub created_at: String,
}

/// Partial update; a replaced message array recomputes `full_transcript`
/// unless one is supplied explicitly.
#[derive(Debug, Clone, Default)]
pub struct TranscriptUpdate {
    pub messages: Option<Vec<TranscriptMessage>>,
    pub full_transcript: Option<String>,
    pub language: Option<String>,
    pub duration: Option<f64>,
}

/// Derive the combined transcript text: one `"{role}: {response}"` line
/// per message, joined with newlines.
pub fn join_messages(messages: &[TranscriptMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.response))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: SpeakerRole, response: &str) -> TranscriptMessage {
        TranscriptMessage {
            role,
            response: response.to_string(),
            timestamp: None,
            confidence: None,
        }
    }

    #[test]
    fn test_join_single_message() {
        let joined = join_messages(&[msg(SpeakerRole::User, "hi")]);
        assert_eq!(joined, "user: hi");
    }

    #[test]
    fn test_join_multiple_messages() {
        let joined = join_messages(&[
            msg(SpeakerRole::Agent, "Hello, how can I help?"),
            msg(SpeakerRole::User, "I'd like to reschedule."),
        ]);
        assert_eq!(
            joined,
            "agent: Hello, how can I help?\nuser: I'd like to reschedule."
        );
    }
}

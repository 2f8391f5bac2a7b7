use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Intent analysis attached to a call summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallIntent {
    pub primary: String,
    pub confidence: f64,
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
}

/// AI-derived analysis for exactly one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSummary {
    pub id: String,
    pub call_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    pub summary: String,
    pub intent: CallIntent,
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<String>>,
    pub follow_up_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<f64>,
    pub ai_model: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewCallSummary {
    pub call_id: String,
    pub transcript_id: Option<String>,
    pub summary: String,
    pub intent: CallIntent,
    pub key_points: Vec<String>,
    pub action_items: Option<Vec<String>>,
    pub follow_up_required: bool,
    pub satisfaction_score: Option<f64>,
    pub ai_model: String,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryUpdate {
    pub summary: Option<String>,
    pub intent: Option<CallIntent>,
    pub key_points: Option<Vec<String>>,
    pub action_items: Option<Vec<String>>,
    pub follow_up_required: Option<bool>,
    pub satisfaction_score: Option<f64>,
    pub ai_model: Option<String>,
}

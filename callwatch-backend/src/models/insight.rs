use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Warning,
    Info,
    Success,
    Recommendation,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Warning => "warning",
            InsightType::Info => "info",
            InsightType::Success => "success",
            InsightType::Recommendation => "recommendation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "warning" => Some(InsightType::Warning),
            "info" => Some(InsightType::Info),
            "success" => Some(InsightType::Success),
            "recommendation" => Some(InsightType::Recommendation),
            _ => None,
        }
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An advisory note generated by the external analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub message: String,
    pub confidence: f64,
    pub actionable: bool,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewInsight {
    pub insight_type: InsightType,
    pub message: String,
    pub confidence: f64,
    pub actionable: bool,
}

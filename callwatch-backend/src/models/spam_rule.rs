use serde::{Deserialize, Serialize};

/// A named spam-detection heuristic. The pattern is stored verbatim;
/// matching is performed by the external screening service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamRule {
    pub id: String,
    pub name: String,
    pub pattern: String,
    pub is_active: bool,
    pub confidence: f64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewSpamRule {
    pub name: String,
    pub pattern: String,
    pub is_active: bool,
    pub confidence: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct SpamRuleUpdate {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub is_active: Option<bool>,
    pub confidence: Option<f64>,
    pub description: Option<String>,
}

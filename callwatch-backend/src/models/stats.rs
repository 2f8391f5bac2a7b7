use serde::{Deserialize, Serialize};

/// Aggregated call statistics snapshot, recomputed from the `calls` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub total_calls: i64,
    pub personal_calls: i64,
    pub business_calls: i64,
    pub spam_blocked: i64,
    pub spam_percentage: f64,
    pub allowed_calls: i64,
    pub blocked_calls: i64,
    pub avg_call_duration: f64,
    pub top_spam_numbers: Vec<String>,
    pub calls_change: i64,
    pub spam_change: i64,
    pub calculated_at: String,
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Level;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSprintBurndown {
    pub total_points: u32,
    pub completed_points: u32,
    pub remaining_points: u32,
    pub days_remaining: u32,
    pub on_track: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownSummary {
    pub current_sprint: CurrentSprintBurndown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityTrends {
    pub velocity_trend: String,
    pub completion_rate: f64,
    pub team_satisfaction: f64,
    pub code_quality_score: f64,
    pub delivery_predictability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub standups_generated: u64,
    pub tickets_created: u64,
    pub sprints_planned: u64,
    pub blockers_detected: u64,
    pub retrospectives_completed: u64,
    pub avg_team_velocity: f64,
    pub team_health_score: u32,
    pub burndown_data: BurndownSummary,
    pub productivity_trends: ProductivityTrends,
    pub integration_status: BTreeMap<String, bool>,
    pub active_users: u32,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Prediction,
    Recommendation,
    Alert,
    Optimization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsight {
    pub id: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    /// 0 to 1.
    pub confidence: f64,
    pub impact: Level,
    pub category: String,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownPoint {
    pub day: u32,
    /// Rounded to one decimal.
    pub ideal_remaining: f64,
    pub actual_remaining: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintBurndown {
    pub sprint_id: String,
    pub burndown_data: Vec<BurndownPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn insight_type_serializes_under_type_key() {
        let insight = AiInsight {
            id: "i-1".into(),
            insight_type: InsightType::Prediction,
            title: "t".into(),
            description: "d".into(),
            confidence: 0.5,
            impact: Level::High,
            category: "performance".into(),
            suggested_actions: vec![],
            data_sources: vec![],
            timestamp: datetime!(2026-03-01 00:00:00 UTC),
        };
        let value = serde_json::to_value(&insight).unwrap();
        assert_eq!(value["type"], "prediction");
        assert_eq!(value["impact"], "high");
        assert_eq!(value["timestamp"], "2026-03-01T00:00:00Z");
    }
}

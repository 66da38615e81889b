use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{require_text, Level, Sentiment, Validate};
use crate::error::ValidationError;

fn default_team_mood() -> String {
    "neutral".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrospectiveInput {
    pub sprint_id: String,
    pub went_well: String,
    pub went_poorly: String,
    pub improvements: String,
    #[serde(default = "default_team_mood")]
    pub team_mood: String,
    /// Story points completed. Zero means unknown.
    #[serde(default)]
    pub velocity_achieved: u32,
    /// Percent of goals met, 0 to 100.
    #[serde(default)]
    pub goals_met: u8,
}

impl Validate for RetrospectiveInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("sprint_id", &self.sprint_id)?;
        if self.goals_met > 100 {
            return Err(ValidationError::new("goals_met", "must be between 0 and 100"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentTrends {
    pub compared_to_last_sprint: String,
    #[serde(default)]
    pub key_mood_drivers: Vec<String>,
}

/// Satisfaction, collaboration and communication are on a 0 to 5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub overall_sentiment: Sentiment,
    pub team_satisfaction: f64,
    pub energy_level: Level,
    pub collaboration_score: f64,
    pub communication_effectiveness: f64,
    pub sentiment_trends: SentimentTrends,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityMetrics {
    pub planned: u32,
    pub achieved: u32,
    pub variance: f64,
    pub trend: String,
}

/// Percentages are 0 to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub bugs_found: u32,
    pub code_coverage: f64,
    pub review_approval_rate: f64,
    pub rework_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMetrics {
    pub goals_completion_rate: u8,
    pub on_time_delivery: f64,
    pub scope_creep: f64,
    pub technical_debt_added: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub velocity: VelocityMetrics,
    pub quality_metrics: QualityMetrics,
    pub team_metrics: TeamMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityTrends {
    pub current_sprint: u32,
    pub last_3_sprints_avg: u32,
    pub trend_direction: String,
    pub predictive_velocity: f64,
    pub confidence_interval: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrospectiveOutput {
    pub id: String,
    pub sprint_id: String,
    pub summary: String,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    pub mood_analysis: MoodAnalysis,
    pub performance_metrics: PerformanceMetrics,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub process_improvements: Vec<String>,
    /// 0 to 100.
    pub team_health_score: u8,
    pub velocity_trends: VelocityTrends,
    pub formatted_output: String,
    pub executive_summary: String,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "sprint_id": "s-1",
            "went_well": "pairing",
            "went_poorly": "flaky CI",
            "improvements": "fix CI"
        })
    }

    #[test]
    fn defaults_apply() {
        let input: RetrospectiveInput = serde_json::from_value(base()).unwrap();
        assert_eq!(input.team_mood, "neutral");
        assert_eq!(input.velocity_achieved, 0);
        assert_eq!(input.goals_met, 0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn goals_met_above_100_is_rejected() {
        let mut body = base();
        body["goals_met"] = json!(101);
        let input: RetrospectiveInput = serde_json::from_value(body).unwrap();
        assert_eq!(input.validate().unwrap_err().field, "goals_met");
    }

    #[test]
    fn negative_velocity_fails_to_parse() {
        let mut body = base();
        body["velocity_achieved"] = json!(-3);
        assert!(serde_json::from_value::<RetrospectiveInput>(body).is_err());
    }
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{require_text, Level, Sentiment, Validate};
use crate::error::ValidationError;

fn default_member_name() -> String {
    "Team Member".to_string()
}

fn default_mood() -> String {
    "neutral".to_string()
}

fn default_confidence() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupInput {
    pub team_member_id: String,
    #[serde(default = "default_member_name")]
    pub team_member_name: String,
    pub yesterday: String,
    pub today: String,
    #[serde(default)]
    pub blockers: String,
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default = "default_confidence")]
    pub confidence_level: u8,
}

impl StandupInput {
    pub fn has_blockers(&self) -> bool {
        !self.blockers.trim().is_empty()
    }
}

impl Validate for StandupInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("team_member_id", &self.team_member_id)?;
        if !(1..=10).contains(&self.confidence_level) {
            return Err(ValidationError::new(
                "confidence_level",
                "must be between 1 and 10",
            ));
        }
        Ok(())
    }
}

/// Emotional read of a standup update. `confidence` is within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    pub confidence: f64,
    #[serde(default)]
    pub mood_indicators: Vec<String>,
    pub stress_level: Level,
}

/// `risk_score` is within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: Level,
    pub risk_score: f64,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub mitigation_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupOutput {
    pub id: String,
    pub team_member_id: String,
    pub team_member_name: String,
    pub summary: String,
    pub formatted_output: String,
    pub slack_format: String,
    pub markdown_format: String,
    pub jira_format: String,
    pub sentiment_analysis: SentimentAnalysis,
    pub risk_assessment: RiskAssessment,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub auto_actions: Vec<String>,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub timestamp: OffsetDateTime,
}

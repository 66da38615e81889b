use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Severity, Validate};
use crate::error::ValidationError;

fn default_days_threshold() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// Blocker scan parameters. `team_data` is accepted for forward
/// compatibility and not consulted by the current scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerInput {
    #[serde(default)]
    pub team_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_days_threshold")]
    pub days_threshold: u32,
    #[serde(default = "default_true")]
    pub include_external_dependencies: bool,
    #[serde(default = "default_true")]
    pub analyze_code_reviews: bool,
}

impl Default for BlockerInput {
    fn default() -> Self {
        BlockerInput {
            team_data: serde_json::Map::new(),
            days_threshold: default_days_threshold(),
            include_external_dependencies: true,
            analyze_code_reviews: true,
        }
    }
}

impl Validate for BlockerInput {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.days_threshold == 0 {
            return Err(ValidationError::new("days_threshold", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerAlert {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: String,
    #[serde(default)]
    pub affected_team_members: Vec<String>,
    #[serde(default)]
    pub affected_tickets: Vec<String>,
    pub recommended_action: String,
    #[serde(default)]
    pub auto_resolution_available: bool,
    #[serde(default)]
    pub escalation_required: bool,
    pub sla_impact: String,
    pub business_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerFrequency {
    pub this_week: u32,
    pub last_week: u32,
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTime {
    pub average_hours: u32,
    pub fastest_resolution: String,
    pub slowest_resolution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub high_impact_blockers: u32,
    /// Percent.
    pub team_productivity_impact: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub blocker_frequency: BlockerFrequency,
    #[serde(default)]
    pub common_categories: Vec<String>,
    pub resolution_time: ResolutionTime,
    pub impact_analysis: ImpactAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerOutput {
    pub id: String,
    #[serde(default)]
    pub alerts: Vec<BlockerAlert>,
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub auto_resolutions: Vec<String>,
    #[serde(default)]
    pub escalations: Vec<String>,
    #[serde(default)]
    pub prevention_suggestions: Vec<String>,
    pub trend_analysis: TrendAnalysis,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl BlockerOutput {
    /// Keep only alerts of `severity`. Returns `None` when nothing is left.
    pub fn narrowed_to(mut self, severity: Severity) -> Option<Self> {
        self.alerts.retain(|a| a.severity == severity);
        if self.alerts.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::{require_text, Priority, Status, Validate};
use crate::error::ValidationError;

fn default_team_capacity() -> u32 {
    40
}

fn default_sprint_duration() -> u32 {
    14
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintInput {
    pub name: String,
    /// Comma-separated objectives.
    pub objectives: String,
    /// Hours available across the team.
    #[serde(default = "default_team_capacity")]
    pub team_capacity: u32,
    /// Days.
    #[serde(default = "default_sprint_duration")]
    pub sprint_duration: u32,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(default)]
    pub team_members: Vec<String>,
}

impl SprintInput {
    /// Kickoff, mid-sprint review, feature freeze and review dates all have
    /// a four-digit year, so the milestones can be written as RFC 3339.
    fn milestones_are_representable(&self) -> bool {
        let in_range = |date: Option<OffsetDateTime>| date.is_some_and(|d| (1..=9999).contains(&d.year()));
        in_range(Some(self.start_date))
            && in_range(self.start_date.checked_add(Duration::days(7)))
            && in_range(self.end_date.checked_sub(Duration::days(2)))
            && in_range(Some(self.end_date))
    }

    /// Trimmed, non-empty objectives in input order.
    pub fn objective_list(&self) -> Vec<&str> {
        self.objectives
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect()
    }
}

impl Validate for SprintInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if self.team_capacity == 0 {
            return Err(ValidationError::new("team_capacity", "must be greater than 0"));
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::new(
                "end_date",
                "must not be earlier than start_date",
            ));
        }
        if !self.milestones_are_representable() {
            return Err(ValidationError::new(
                "start_date",
                "sprint dates must fall between years 0001 and 9999",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintTask {
    pub title: String,
    pub description: String,
    pub estimated_hours: u32,
    pub story_points: u32,
    pub priority: Priority,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTargets {
    pub bug_rate_threshold: f64,
    pub code_coverage_target: f64,
    pub review_approval_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessMetrics {
    pub velocity_target: u32,
    pub completion_rate_target: f64,
    pub quality_metrics: QualityTargets,
    pub team_satisfaction_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub date: OffsetDateTime,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintOutput {
    pub id: String,
    pub name: String,
    pub sprint_goal: String,
    #[serde(default)]
    pub tasks: Vec<SprintTask>,
    pub total_estimated_hours: u32,
    pub total_story_points: u32,
    /// Percent of `team_capacity`; may exceed 100.
    pub capacity_utilization: f64,
    pub velocity_prediction: f64,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub success_metrics: SuccessMetrics,
    /// Member id to task titles.
    #[serde(default)]
    pub team_assignments: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub milestone_tracking: Vec<Milestone>,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub timestamp: OffsetDateTime,
}

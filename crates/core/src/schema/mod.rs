//! Typed records for every artifact, their inputs, and the supporting
//! records (team members, integration settings, dashboard data).
//!
//! Inputs deserialize with the documented defaults and are checked with
//! [`Validate`] before any generation runs. Outputs are always fully
//! populated: lists serialize as `[]`, never `null`.

mod blocker;
mod dashboard;
mod enums;
mod retrospective;
mod sprint;
mod standup;
mod team;
mod ticket;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use blocker::{
    BlockerAlert, BlockerFrequency, BlockerInput, BlockerOutput, ImpactAnalysis, ResolutionTime,
    TrendAnalysis,
};
pub use dashboard::{
    AiInsight, BurndownPoint, BurndownSummary, CurrentSprintBurndown, DashboardMetrics,
    InsightType, ProductivityTrends, SprintBurndown,
};
pub use enums::{Level, Priority, Sentiment, Severity, Status};
pub use retrospective::{
    MoodAnalysis, PerformanceMetrics, QualityMetrics, RetrospectiveInput, RetrospectiveOutput,
    SentimentTrends, TeamMetrics, VelocityMetrics, VelocityTrends,
};
pub use sprint::{Milestone, QualityTargets, SprintInput, SprintOutput, SprintTask, SuccessMetrics};
pub use standup::{RiskAssessment, SentimentAnalysis, StandupInput, StandupOutput};
pub use team::{GitHubIntegration, IntegrationSettings, JiraIntegration, SlackIntegration, TeamMember};
pub use ticket::{TicketInput, TicketOutput, TicketUpdate};

/// Input checks that serde's shape validation cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Fresh opaque identifier (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// The five generated artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Standup,
    Ticket,
    Sprint,
    Blocker,
    Retrospective,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Standup,
        ArtifactKind::Ticket,
        ArtifactKind::Sprint,
        ArtifactKind::Blocker,
        ArtifactKind::Retrospective,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Standup => "standup",
            ArtifactKind::Ticket => "ticket",
            ArtifactKind::Sprint => "sprint",
            ArtifactKind::Blocker => "blocker",
            ArtifactKind::Retrospective => "retrospective",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standup" => Ok(ArtifactKind::Standup),
            "ticket" => Ok(ArtifactKind::Ticket),
            "sprint" => Ok(ArtifactKind::Sprint),
            "blocker" | "blockers" => Ok(ArtifactKind::Blocker),
            "retrospective" => Ok(ArtifactKind::Retrospective),
            other => Err(format!("unknown module '{}'", other)),
        }
    }
}

use time::OffsetDateTime;

use crate::schema::{new_id, AiInsight, InsightType, Level};

#[allow(clippy::too_many_arguments)]
fn insight(
    insight_type: InsightType,
    title: &str,
    description: &str,
    confidence: f64,
    impact: Level,
    category: &str,
    suggested_actions: &[&str],
    data_sources: &[&str],
    now: OffsetDateTime,
) -> AiInsight {
    AiInsight {
        id: new_id(),
        insight_type,
        title: title.to_string(),
        description: description.to_string(),
        confidence,
        impact,
        category: category.to_string(),
        suggested_actions: suggested_actions.iter().map(|s| s.to_string()).collect(),
        data_sources: data_sources.iter().map(|s| s.to_string()).collect(),
        timestamp: now,
    }
}

/// The insight set, optionally narrowed to one category and cut to `limit`.
///
/// Every call mints fresh identifiers.
pub fn canned_insights(category: Option<&str>, limit: usize, now: OffsetDateTime) -> Vec<AiInsight> {
    vec![
        insight(
            InsightType::Prediction,
            "Sprint Velocity Prediction",
            "Based on current progress, team is likely to complete 38-42 story points this sprint",
            0.85,
            Level::Medium,
            "performance",
            &["Monitor daily progress", "Adjust scope if needed"],
            &["sprint_progress", "historical_velocity"],
            now,
        ),
        insight(
            InsightType::Recommendation,
            "Code Review Optimization",
            "Average review time is 18 hours. Consider implementing review rotation schedule",
            0.92,
            Level::High,
            "process",
            &["Implement review assignment rotation", "Set review SLA targets"],
            &["code_review_metrics", "team_workload"],
            now,
        ),
        insight(
            InsightType::Alert,
            "Team Burnout Risk",
            "Team member satisfaction trending downward - consider workload adjustment",
            0.78,
            Level::High,
            "team_health",
            &[
                "Schedule 1:1 meetings",
                "Review sprint capacity",
                "Plan team building activities",
            ],
            &["team_sentiment", "workload_analysis", "retrospective_feedback"],
            now,
        ),
        insight(
            InsightType::Optimization,
            "Deployment Efficiency",
            "Automated deployment pipeline could reduce release time by 40%",
            0.88,
            Level::Medium,
            "technical",
            &[
                "Implement CI/CD pipeline",
                "Automate testing",
                "Create deployment templates",
            ],
            &["deployment_metrics", "manual_process_analysis"],
            now,
        ),
    ]
    .into_iter()
    .filter(|i| category.map_or(true, |c| i.category == c))
    .take(limit)
    .collect()
}

use rand::Rng;
use time::OffsetDateTime;

use super::truncate_chars;
use crate::error::GenerationError;
use crate::fallback::{self, absorb};
use crate::schema::{
    new_id, ArtifactKind, Level, MoodAnalysis, PerformanceMetrics, QualityMetrics,
    RetrospectiveInput, RetrospectiveOutput, Sentiment, SentimentTrends, TeamMetrics,
    VelocityMetrics, VelocityTrends,
};
use crate::timestamp;

const BASE_ACTION_ITEMS: &[&str] = &[
    "Implement suggested process improvements in next sprint planning",
    "Schedule dedicated time for technical debt reduction",
    "Create knowledge sharing session for successful practices",
    "Address identified pain points through targeted solutions",
    "Update team working agreements based on feedback",
];

const PROCESS_IMPROVEMENTS: &[&str] = &[
    "Enhance sprint planning with better story point estimation",
    "Implement continuous integration improvements for faster feedback",
    "Establish clearer definition of done criteria",
    "Create better documentation and knowledge sharing processes",
    "Optimize code review process to reduce cycle time",
];

/// Mean of the component ratios rescaled to 0..=100, rounded down.
///
/// Components: satisfaction / 5, min(achieved / planned, 1), coverage / 100,
/// (100 - scope creep) / 100, collaboration / 5.
pub fn team_health_score(mood: &MoodAnalysis, performance: &PerformanceMetrics) -> u8 {
    let velocity = &performance.velocity;
    let velocity_ratio = if velocity.planned == 0 {
        1.0
    } else {
        (f64::from(velocity.achieved) / f64::from(velocity.planned)).min(1.0)
    };
    let factors = [
        mood.team_satisfaction / 5.0,
        velocity_ratio,
        performance.quality_metrics.code_coverage / 100.0,
        (100.0 - performance.team_metrics.scope_creep) / 100.0,
        mood.collaboration_score / 5.0,
    ];
    let mean = factors.iter().sum::<f64>() / factors.len() as f64;
    (mean * 100.0).floor().clamp(0.0, 100.0) as u8
}

fn velocity_trend(variance: f64) -> &'static str {
    if variance > 0.1 {
        "improving"
    } else if variance > -0.1 {
        "stable"
    } else {
        "declining"
    }
}

/// Retrospective analytics over simulated team measurements.
///
/// The achieved velocity is the caller's when non-zero.
pub fn generate_retrospective<R: Rng + ?Sized>(
    input: &RetrospectiveInput,
    rng: &mut R,
) -> RetrospectiveOutput {
    absorb(
        ArtifactKind::Retrospective,
        build(input, rng, timestamp::now()),
        || fallback::retrospective(input),
    )
}

fn build<R: Rng + ?Sized>(
    input: &RetrospectiveInput,
    rng: &mut R,
    now: OffsetDateTime,
) -> Result<RetrospectiveOutput, GenerationError> {
    let went_well = rng.gen_range(0.7..0.9);
    let went_poorly = rng.gen_range(0.1..0.4);
    let improvements = rng.gen_range(0.5..0.8);
    let overall = (went_well + (1.0 - went_poorly) + improvements) / 3.0;

    let overall_sentiment = if overall > 0.7 {
        Sentiment::Positive
    } else if overall > 0.4 {
        Sentiment::Neutral
    } else {
        Sentiment::Negative
    };
    let mood = MoodAnalysis {
        overall_sentiment,
        team_satisfaction: rng.gen_range(3.5..4.8),
        energy_level: if overall > 0.7 { Level::High } else { Level::Medium },
        collaboration_score: rng.gen_range(4.0..5.0),
        communication_effectiveness: rng.gen_range(3.8..4.9),
        sentiment_trends: SentimentTrends {
            compared_to_last_sprint: if overall > 0.6 { "improved" } else { "stable" }
                .to_string(),
            key_mood_drivers: if overall > 0.6 {
                vec!["good team collaboration", "clear sprint goals"]
            } else {
                vec!["unclear requirements", "time pressure"]
            }
            .into_iter()
            .map(String::from)
            .collect(),
        },
    };

    let variance = rng.gen_range(-0.2..0.3);
    let planned = rng.gen_range(25..=40);
    let achieved = if input.velocity_achieved > 0 {
        input.velocity_achieved
    } else {
        rng.gen_range(20..=35)
    };
    let trend = velocity_trend(variance);
    let performance = PerformanceMetrics {
        velocity: VelocityMetrics {
            planned,
            achieved,
            variance,
            trend: trend.to_string(),
        },
        quality_metrics: QualityMetrics {
            bugs_found: rng.gen_range(2..=8),
            code_coverage: rng.gen_range(85.0..95.0),
            review_approval_rate: rng.gen_range(90.0..98.0),
            rework_percentage: rng.gen_range(5.0..15.0),
        },
        team_metrics: TeamMetrics {
            goals_completion_rate: input.goals_met,
            on_time_delivery: rng.gen_range(75.0..95.0),
            scope_creep: rng.gen_range(0.0..20.0),
            technical_debt_added: rng.gen_range(2.0..10.0),
        },
    };

    let key_insights = vec![
        format!(
            "Team demonstrated strong performance in: {}...",
            truncate_chars(&input.went_well, 100)
        ),
        format!(
            "Primary improvement opportunity: {}...",
            truncate_chars(&input.went_poorly, 100)
        ),
        format!(
            "Proposed enhancement shows {:.0}% positivity: {}...",
            improvements * 100.0,
            truncate_chars(&input.improvements, 100)
        ),
        format!(
            "Velocity trend is {} with {:.1}% variance",
            trend,
            variance.abs() * 100.0
        ),
        format!(
            "Team satisfaction at {:.1}/5.0 - {} outlook",
            mood.team_satisfaction, mood.overall_sentiment
        ),
    ];

    let mut action_items: Vec<String> = BASE_ACTION_ITEMS.iter().map(|a| a.to_string()).collect();
    if variance < -0.1 {
        action_items.push("Investigate velocity decline and implement improvement measures".into());
    }
    if mood.team_satisfaction < 4.0 {
        action_items
            .push("Schedule individual team member check-ins to address concerns".into());
    }
    let process_improvements: Vec<String> =
        PROCESS_IMPROVEMENTS.iter().map(|p| p.to_string()).collect();

    let health = team_health_score(&mood, &performance);
    let velocity_trends = VelocityTrends {
        current_sprint: achieved,
        last_3_sprints_avg: rng.gen_range(25..=35),
        trend_direction: trend.to_string(),
        predictive_velocity: f64::from(achieved) * (1.0 + variance),
        confidence_interval: format!("\u{b1}{} story points", rng.gen_range(3..=8)),
    };

    let executive_summary = format!(
        "**Sprint Retrospective Executive Summary**

**Performance Overview:**
- Velocity: {achieved} story points ({trend})
- Goals Completion: {goals}%
- Team Health Score: {health}/100
- Team Satisfaction: {satisfaction:.1}/5.0

**Key Outcomes:**
- {insights} insights identified
- {actions} action items for next sprint
- {improvements} process improvements proposed

**Recommendations:**
Focus on {focus} and maintain momentum in areas showing positive trends.
",
        achieved = achieved,
        trend = trend,
        goals = input.goals_met,
        health = health,
        satisfaction = mood.team_satisfaction,
        insights = key_insights.len(),
        actions = action_items.len(),
        improvements = process_improvements.len(),
        focus = action_items[0].to_lowercase(),
    );

    let bullets = |items: &[String]| {
        items
            .iter()
            .take(3)
            .map(|i| format!("\u{2022} {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let formatted_output = format!(
        "**Sprint Retrospective Analysis - Sprint {sprint}**

**What Went Well:**
\u{2022} {went_well}

**Areas for Improvement:**
\u{2022} {went_poorly}

**Action Plan:**
\u{2022} {improvements}

**Performance Metrics:**
\u{2022} Velocity: {achieved} story points (planned: {planned})
\u{2022} Goals Completion: {goals}%
\u{2022} Team Health Score: {health}/100
\u{2022} Code Coverage: {coverage:.1}%

**Team Sentiment:** {sentiment} (Satisfaction: {satisfaction:.1}/5.0)

**Next Sprint Actions:**
{actions}

**Process Improvements:**
{process}
",
        sprint = input.sprint_id,
        went_well = input.went_well,
        went_poorly = input.went_poorly,
        improvements = input.improvements,
        achieved = achieved,
        planned = planned,
        goals = input.goals_met,
        health = health,
        coverage = performance.quality_metrics.code_coverage,
        sentiment = mood.overall_sentiment.title(),
        satisfaction = mood.team_satisfaction,
        actions = bullets(&action_items),
        process = bullets(&process_improvements),
    );

    Ok(RetrospectiveOutput {
        id: new_id(),
        sprint_id: input.sprint_id.clone(),
        summary: format!(
            "Sprint retrospective analysis completed with {}/100 team health score",
            health
        ),
        key_insights,
        action_items,
        mood_analysis: mood,
        performance_metrics: performance,
        recommendations: process_improvements.clone(),
        process_improvements,
        team_health_score: health,
        velocity_trends,
        formatted_output,
        executive_summary,
        timestamp: now,
    })
}

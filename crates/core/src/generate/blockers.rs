use rand::seq::SliceRandom;
use rand::Rng;
use time::OffsetDateTime;

use crate::error::GenerationError;
use crate::fallback::{self, absorb};
use crate::schema::{
    new_id, ArtifactKind, BlockerAlert, BlockerFrequency, BlockerInput, BlockerOutput,
    ImpactAnalysis, ResolutionTime, Severity, TrendAnalysis,
};
use crate::timestamp;

const ACTION_ITEMS: &[&str] = &[
    "Schedule immediate blocker resolution meeting with stakeholders",
    "Update project timeline and communicate impacts to management",
    "Implement temporary workarounds where possible",
    "Document blocker patterns for future prevention",
    "Review and update escalation procedures",
];

const PREVENTION_SUGGESTIONS: &[&str] = &[
    "Implement code review SLA monitoring and alerts",
    "Create dependency risk register and mitigation plans",
    "Establish backup environments for critical testing",
    "Cross-train team members on critical system components",
    "Implement automated health checks for key dependencies",
];

#[allow(clippy::too_many_arguments)]
fn alert(
    title: &str,
    description: &str,
    severity: Severity,
    category: &str,
    members: &[&str],
    tickets: &[&str],
    action: &str,
    auto_resolution: bool,
    escalation: bool,
    sla: &str,
    business: &str,
) -> BlockerAlert {
    BlockerAlert {
        title: title.to_string(),
        description: description.to_string(),
        severity,
        category: category.to_string(),
        affected_team_members: members.iter().map(|m| m.to_string()).collect(),
        affected_tickets: tickets.iter().map(|t| t.to_string()).collect(),
        recommended_action: action.to_string(),
        auto_resolution_available: auto_resolution,
        escalation_required: escalation,
        sla_impact: sla.to_string(),
        business_impact: business.to_string(),
    }
}

/// Canned alert templates grouped by catalog category.
pub fn alert_catalog() -> Vec<(&'static str, Vec<BlockerAlert>)> {
    vec![
        (
            "Code Review",
            vec![
                alert(
                    "Stalled Pull Request",
                    "PR #234 'Authentication Module' has been pending review for 4 days",
                    Severity::High,
                    "Code Review",
                    &["Alice Johnson", "Bob Smith"],
                    &["AUTH-123", "SEC-456"],
                    "Assign backup reviewer or schedule immediate review session",
                    true,
                    false,
                    "2 days behind schedule",
                    "Blocks user authentication feature delivery",
                ),
                alert(
                    "Review Bottleneck",
                    "3 PRs waiting for senior developer review - creating team bottleneck",
                    Severity::Medium,
                    "Code Review",
                    &["Senior Dev Team"],
                    &["DEV-789", "REF-012", "FIX-345"],
                    "Distribute review load among senior team members",
                    true,
                    false,
                    "1 day potential delay",
                    "May impact sprint velocity",
                ),
            ],
        ),
        (
            "Dependencies",
            vec![
                alert(
                    "External API Dependency",
                    "Payment gateway API migration delayed by vendor - affects checkout flow",
                    Severity::Critical,
                    "External Dependencies",
                    &["Payment Team", "Frontend Team"],
                    &["PAY-567", "CHECK-890"],
                    "Implement fallback payment method or negotiate expedited timeline",
                    false,
                    true,
                    "5 days behind schedule",
                    "Revenue impact - checkout functionality unavailable",
                ),
                alert(
                    "Database Migration Issue",
                    "Production database migration failing - blocks feature deployment",
                    Severity::High,
                    "Infrastructure",
                    &["DevOps Team", "Backend Team"],
                    &["DB-234", "DEPLOY-567"],
                    "Schedule emergency DB maintenance window and rollback plan",
                    false,
                    true,
                    "2 days deployment delay",
                    "Feature release postponed",
                ),
            ],
        ),
        (
            "Environment",
            vec![alert(
                "Staging Environment Instability",
                "Staging server intermittent failures affecting QA testing",
                Severity::Medium,
                "Environment",
                &["QA Team", "DevOps Team"],
                &["QA-123", "ENV-456"],
                "Provision backup testing environment and investigate root cause",
                true,
                false,
                "1 day testing delay",
                "Quality assurance process disrupted",
            )],
        ),
        (
            "Team",
            vec![alert(
                "Key Team Member Unavailable",
                "Lead architect on unplanned leave - critical decisions blocked",
                Severity::High,
                "Team Availability",
                &["Architecture Team"],
                &["ARCH-789", "DESIGN-012"],
                "Identify interim decision maker and document pending decisions",
                false,
                true,
                "Unknown duration",
                "Technical decisions and architecture reviews blocked",
            )],
        ),
    ]
}

/// Simulated blocker scan.
///
/// Picks one to three catalog categories and a non-empty subset of each.
/// `input.team_data` is not consulted.
pub fn generate_blockers<R: Rng + ?Sized>(input: &BlockerInput, rng: &mut R) -> BlockerOutput {
    absorb(
        ArtifactKind::Blocker,
        build(rng, timestamp::now()),
        || fallback::blockers(input),
    )
}

fn build<R: Rng + ?Sized>(
    rng: &mut R,
    now: OffsetDateTime,
) -> Result<BlockerOutput, GenerationError> {
    let catalog = alert_catalog();
    let category_count = rng.gen_range(1..=3);
    let mut alerts = Vec::new();
    for (_, templates) in catalog.choose_multiple(rng, category_count) {
        let alert_count = rng.gen_range(1..=templates.len());
        alerts.extend(templates.choose_multiple(rng, alert_count).cloned());
    }

    let this_week = alerts.len() as u32;
    let productivity_impact = rng.gen_range(10..=30);
    let trend_analysis = TrendAnalysis {
        blocker_frequency: BlockerFrequency {
            this_week,
            last_week: rng.gen_range(1..=5),
            trend: if this_week > 3 { "increasing" } else { "stable" }.to_string(),
        },
        common_categories: ["Code Review", "External Dependencies", "Environment"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        resolution_time: ResolutionTime {
            average_hours: rng.gen_range(12..=48),
            fastest_resolution: "2 hours".to_string(),
            slowest_resolution: "5 days".to_string(),
        },
        impact_analysis: ImpactAnalysis {
            high_impact_blockers: alerts
                .iter()
                .filter(|a| a.severity.is_high_impact())
                .count() as u32,
            team_productivity_impact: productivity_impact,
        },
    };

    let severity_counts = Severity::ALL
        .iter()
        .filter_map(|sev| {
            let count = alerts.iter().filter(|a| a.severity == *sev).count();
            (count > 0).then(|| format!("{} {}", count, sev))
        })
        .collect::<Vec<_>>()
        .join(", ");
    let summary = format!(
        "Detected {} active blockers: {}. Team productivity potentially impacted by {}%.",
        alerts.len(),
        severity_counts,
        productivity_impact
    );

    let auto_resolutions = alerts
        .iter()
        .filter(|a| a.auto_resolution_available)
        .map(|a| format!("Auto-assign backup reviewer for {}", a.title))
        .collect();
    let escalations = alerts
        .iter()
        .filter(|a| a.escalation_required)
        .map(|a| {
            format!(
                "Escalate {} to management - business impact: {}",
                a.title, a.business_impact
            )
        })
        .collect();

    Ok(BlockerOutput {
        id: new_id(),
        alerts,
        summary,
        action_items: ACTION_ITEMS.iter().map(|a| a.to_string()).collect(),
        auto_resolutions,
        escalations,
        prevention_suggestions: PREVENTION_SUGGESTIONS.iter().map(|p| p.to_string()).collect(),
        trend_analysis,
        timestamp: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scan(seed: u64) -> BlockerOutput {
        generate_blockers(&BlockerInput::default(), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn catalog_has_six_alerts_in_four_categories() {
        let catalog = alert_catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.iter().map(|(_, a)| a.len()).sum::<usize>(), 6);
    }

    #[test]
    fn selections_stay_within_bounds() {
        for seed in 0..50 {
            let out = scan(seed);
            let trend = &out.trend_analysis;
            assert!((1..=6).contains(&out.alerts.len()));
            assert_eq!(trend.blocker_frequency.this_week as usize, out.alerts.len());
            assert!((1..=5).contains(&trend.blocker_frequency.last_week));
            assert!((12..=48).contains(&trend.resolution_time.average_hours));
            assert!((10..=30).contains(&trend.impact_analysis.team_productivity_impact));
            let expected_trend = if out.alerts.len() > 3 { "increasing" } else { "stable" };
            assert_eq!(trend.blocker_frequency.trend, expected_trend);
        }
    }

    #[test]
    fn no_alert_is_selected_twice() {
        for seed in 0..50 {
            let out = scan(seed);
            let mut titles: Vec<_> = out.alerts.iter().map(|a| a.title.as_str()).collect();
            titles.sort();
            titles.dedup();
            assert_eq!(titles.len(), out.alerts.len());
        }
    }

    #[test]
    fn derived_lists_match_alert_flags() {
        for seed in 0..30 {
            let out = scan(seed);
            let auto = out.alerts.iter().filter(|a| a.auto_resolution_available).count();
            let escalate = out.alerts.iter().filter(|a| a.escalation_required).count();
            let high = out.alerts.iter().filter(|a| a.severity.is_high_impact()).count();
            assert_eq!(out.auto_resolutions.len(), auto);
            assert_eq!(out.escalations.len(), escalate);
            assert_eq!(out.trend_analysis.impact_analysis.high_impact_blockers as usize, high);
            assert!(out
                .summary
                .starts_with(&format!("Detected {} active blockers: ", out.alerts.len())));
        }
    }

    #[test]
    fn team_data_does_not_change_the_scan() {
        let mut input = BlockerInput::default();
        input
            .team_data
            .insert("velocity".into(), serde_json::json!([30, 28, 31]));
        let with_data = generate_blockers(&input, &mut StdRng::seed_from_u64(11));
        let without = scan(11);
        assert_eq!(with_data.alerts, without.alerts);
    }
}

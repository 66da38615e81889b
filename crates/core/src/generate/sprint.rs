use std::collections::BTreeMap;

use rand::Rng;
use time::{Duration, OffsetDateTime};

use super::truncate_chars;
use crate::error::GenerationError;
use crate::fallback::{self, absorb, success_metrics};
use crate::schema::{
    new_id, ArtifactKind, Milestone, Priority, SprintInput, SprintOutput, SprintTask, Status,
};
use crate::timestamp;

const MAX_OBJECTIVES: usize = 6;
const DEV_HOURS: [u32; 4] = [8, 12, 16, 20];
const DEV_POINTS: [u32; 4] = [2, 3, 5, 8];
/// Fraction of planned points a team is assumed to complete.
const COMPLETION_RATE: f64 = 0.85;

const BASE_RECOMMENDATIONS: &[&str] = &[
    "Schedule daily standups at consistent times for team synchronization",
    "Plan mid-sprint checkpoint to assess progress and adjust scope if needed",
    "Maintain updated task board for transparency and accountability",
    "Consider pair programming for complex technical tasks",
    "Schedule dedicated time for code reviews to maintain quality",
];

fn task(
    title: String,
    description: String,
    hours: u32,
    points: u32,
    priority: Priority,
    dependencies: Vec<String>,
    tags: &[&str],
) -> SprintTask {
    SprintTask {
        title,
        description,
        estimated_hours: hours,
        story_points: points,
        priority,
        assignee_id: None,
        dependencies,
        status: Status::ToDo,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Ceremony and collaboration tasks every sprint carries.
fn overhead_tasks() -> Vec<SprintTask> {
    [
        (
            "Sprint Planning & Grooming",
            "Sprint planning session, backlog grooming, and task estimation",
            4,
            1,
            Priority::High,
            ["planning", "ceremony"],
        ),
        (
            "Daily Standups & Communication",
            "Daily standup meetings and team communication",
            6,
            1,
            Priority::Medium,
            ["ceremony", "communication"],
        ),
        (
            "Code Reviews & Collaboration",
            "Peer code reviews and collaborative development activities",
            8,
            2,
            Priority::High,
            ["code-review", "collaboration"],
        ),
        (
            "Sprint Review & Demo Prep",
            "Prepare sprint review presentation and demo materials",
            4,
            1,
            Priority::Medium,
            ["demo", "ceremony"],
        ),
    ]
    .into_iter()
    .map(|(title, description, hours, points, priority, tags)| {
        task(
            title.to_string(),
            description.to_string(),
            hours,
            points,
            priority,
            Vec::new(),
            &tags,
        )
    })
    .collect()
}

fn priority_for_position(index: usize) -> Priority {
    match index {
        0 | 1 => Priority::High,
        2 | 3 => Priority::Medium,
        _ => Priority::Low,
    }
}

/// Plan a sprint from comma-separated objectives.
///
/// `capacity_utilization` is always `total_estimated_hours / team_capacity * 100`.
pub fn generate_sprint<R: Rng + ?Sized>(input: &SprintInput, rng: &mut R) -> SprintOutput {
    absorb(
        ArtifactKind::Sprint,
        build(input, rng, timestamp::now()),
        || fallback::sprint(input),
    )
}

fn build<R: Rng + ?Sized>(
    input: &SprintInput,
    rng: &mut R,
    now: OffsetDateTime,
) -> Result<SprintOutput, GenerationError> {
    let objectives = input.objective_list();
    let mut tasks = Vec::new();

    for (i, objective) in objectives.iter().take(MAX_OBJECTIVES).enumerate() {
        let hours = DEV_HOURS[rng.gen_range(0..DEV_HOURS.len())];
        let points = DEV_POINTS[rng.gen_range(0..DEV_POINTS.len())];
        let dev_title = format!("Develop {}", objective);
        tasks.push(task(
            dev_title.clone(),
            format!(
                "Complete development of {} including implementation, testing, and documentation",
                objective
            ),
            hours,
            points,
            priority_for_position(i),
            Vec::new(),
            &["development", "feature"],
        ));
        tasks.push(task(
            format!("Test {}", objective),
            "Comprehensive testing including unit, integration, and user acceptance testing"
                .to_string(),
            hours / 2,
            points / 2,
            Priority::Medium,
            vec![dev_title],
            &["testing", "quality-assurance"],
        ));
    }
    tasks.extend(overhead_tasks());

    let total_hours: u32 = tasks.iter().map(|t| t.estimated_hours).sum();
    let total_points: u32 = tasks.iter().map(|t| t.story_points).sum();
    let capacity_utilization = f64::from(total_hours) / f64::from(input.team_capacity) * 100.0;
    let velocity_prediction = f64::from(total_points) * COMPLETION_RATE;

    let mut risks = Vec::new();
    if capacity_utilization > 90.0 {
        risks.push("Over-capacity planning may lead to sprint spillover".to_string());
    }
    if capacity_utilization > 100.0 {
        risks.push("Critical: Sprint capacity exceeded - reduce scope immediately".to_string());
    }
    if objectives.len() > 4 {
        risks.push("Multiple objectives may dilute team focus".to_string());
    }
    if total_points > 50 {
        risks.push("High story point count indicates complex sprint".to_string());
    }

    let mut recommendations: Vec<String> =
        BASE_RECOMMENDATIONS.iter().map(|r| r.to_string()).collect();
    if capacity_utilization > 85.0 {
        recommendations
            .push("Consider reducing scope or extending timeline to ensure quality".to_string());
    }
    if !risks.is_empty() {
        recommendations.push("Address identified risks before sprint commitment".to_string());
    }

    Ok(SprintOutput {
        id: new_id(),
        name: input.name.clone(),
        sprint_goal: format!(
            "Successfully deliver {} key objectives with high quality: {}...",
            objectives.len(),
            truncate_chars(&input.objectives, 150)
        ),
        team_assignments: assign(&tasks, &input.team_members),
        milestone_tracking: milestones(input)?,
        tasks,
        total_estimated_hours: total_hours,
        total_story_points: total_points,
        capacity_utilization,
        velocity_prediction,
        risks,
        recommendations,
        success_metrics: success_metrics(total_points),
        start_date: input.start_date,
        end_date: input.end_date,
        timestamp: now,
    })
}

/// Even split of task titles in order; the last member takes the remainder.
fn assign(tasks: &[SprintTask], members: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut assignments = BTreeMap::new();
    if members.is_empty() {
        return assignments;
    }
    let per_member = tasks.len() / members.len();
    for (i, member) in members.iter().enumerate() {
        let start = i * per_member;
        let end = if i + 1 == members.len() {
            tasks.len()
        } else {
            start + per_member
        };
        assignments.insert(
            member.clone(),
            tasks[start..end].iter().map(|t| t.title.clone()).collect(),
        );
    }
    assignments
}

fn milestones(input: &SprintInput) -> Result<Vec<Milestone>, GenerationError> {
    let out_of_range = || GenerationError::render("milestone_tracking", "date out of range");
    let mid_sprint = input
        .start_date
        .checked_add(Duration::days(7))
        .ok_or_else(out_of_range)?;
    let freeze = input
        .end_date
        .checked_sub(Duration::days(2))
        .ok_or_else(out_of_range)?;
    Ok([
        ("Sprint Kickoff", input.start_date),
        ("Mid-Sprint Review", mid_sprint),
        ("Feature Freeze", freeze),
        ("Sprint Review", input.end_date),
    ]
    .into_iter()
    .map(|(name, date)| Milestone {
        name: name.to_string(),
        date,
        status: "scheduled".to_string(),
    })
    .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use time::macros::datetime;

    fn input(objectives: &str, capacity: u32, members: &[&str]) -> SprintInput {
        serde_json::from_value(json!({
            "name": "Sprint 12",
            "objectives": objectives,
            "team_capacity": capacity,
            "start_date": "2026-03-02T09:00:00Z",
            "end_date": "2026-03-16T17:00:00Z",
            "team_members": members
        }))
        .unwrap()
    }

    #[test]
    fn utilization_matches_hours_over_capacity() {
        for seed in 0..20 {
            for capacity in [1, 40, 80, 333] {
                let plan = generate_sprint(
                    &input("login, search, billing", capacity, &[]),
                    &mut StdRng::seed_from_u64(seed),
                );
                let expected =
                    f64::from(plan.total_estimated_hours) / f64::from(capacity) * 100.0;
                assert_eq!(plan.capacity_utilization, expected);
            }
        }
    }

    #[test]
    fn pairs_dev_and_test_tasks_then_overheads() {
        let plan = generate_sprint(
            &input("login, search", 200, &[]),
            &mut StdRng::seed_from_u64(5),
        );
        assert_eq!(plan.tasks.len(), 2 * 2 + 4);
        let dev = &plan.tasks[0];
        let test = &plan.tasks[1];
        assert_eq!(dev.title, "Develop login");
        assert!(DEV_HOURS.contains(&dev.estimated_hours));
        assert!(DEV_POINTS.contains(&dev.story_points));
        assert_eq!(test.estimated_hours, dev.estimated_hours / 2);
        assert_eq!(test.story_points, dev.story_points / 2);
        assert_eq!(test.dependencies, vec!["Develop login"]);
        assert_eq!(test.priority, Priority::Medium);
        assert_eq!(plan.tasks[4].title, "Sprint Planning & Grooming");
        assert_eq!(
            plan.total_estimated_hours,
            plan.tasks.iter().map(|t| t.estimated_hours).sum::<u32>()
        );
        assert!((plan.velocity_prediction
            - f64::from(plan.total_story_points) * 0.85)
            .abs()
            < 1e-9);
    }

    #[test]
    fn caps_objectives_and_assigns_priority_by_position() {
        let plan = generate_sprint(
            &input("a, b, c, d, e, f, g, h", 1000, &[]),
            &mut StdRng::seed_from_u64(9),
        );
        let dev: Vec<_> = plan
            .tasks
            .iter()
            .filter(|t| t.title.starts_with("Develop"))
            .collect();
        assert_eq!(dev.len(), 6);
        let priorities: Vec<_> = dev.iter().map(|t| t.priority).collect();
        assert_eq!(
            priorities,
            vec![
                Priority::High,
                Priority::High,
                Priority::Medium,
                Priority::Medium,
                Priority::Low,
                Priority::Low
            ]
        );
        assert!(plan
            .risks
            .contains(&"Multiple objectives may dilute team focus".to_string()));
        assert!(plan.sprint_goal.starts_with("Successfully deliver 8 key objectives"));
    }

    #[test]
    fn over_capacity_adds_risks_and_recommendations() {
        let plan = generate_sprint(&input("a", 10, &[]), &mut StdRng::seed_from_u64(1));
        assert!(plan.capacity_utilization > 100.0);
        assert_eq!(plan.risks.len(), 2);
        assert_eq!(plan.recommendations.len(), 7);

        let roomy = generate_sprint(&input("a", 1000, &[]), &mut StdRng::seed_from_u64(1));
        assert!(roomy.risks.is_empty());
        assert_eq!(roomy.recommendations.len(), 5);
    }

    #[test]
    fn remainder_goes_to_the_last_member() {
        let plan = generate_sprint(
            &input("login", 100, &["ana", "ben", "cy"]),
            &mut StdRng::seed_from_u64(2),
        );
        // 2 objective tasks + 4 overheads = 6 tasks, 2 each
        assert_eq!(plan.team_assignments["ana"].len(), 2);
        assert_eq!(plan.team_assignments["cy"].len(), 2);

        let plan = generate_sprint(
            &input("login, search", 100, &["ana", "ben", "cy"]),
            &mut StdRng::seed_from_u64(2),
        );
        // 8 tasks: 2, 2, 4
        assert_eq!(plan.team_assignments["ana"], vec!["Develop login", "Test login"]);
        assert_eq!(plan.team_assignments["cy"].len(), 4);
    }

    #[test]
    fn milestones_follow_the_sprint_dates() {
        let plan = generate_sprint(&input("a", 100, &[]), &mut StdRng::seed_from_u64(0));
        let dates: Vec<_> = plan.milestone_tracking.iter().map(|m| m.date).collect();
        assert_eq!(
            dates,
            vec![
                datetime!(2026-03-02 09:00:00 UTC),
                datetime!(2026-03-09 09:00:00 UTC),
                datetime!(2026-03-14 17:00:00 UTC),
                datetime!(2026-03-16 17:00:00 UTC),
            ]
        );
        assert!(plan.milestone_tracking.iter().all(|m| m.status == "scheduled"));
    }

    #[test]
    fn unrepresentable_dates_fall_back() {
        let mut sprint = input("a", 100, &[]);
        sprint.end_date = time::Date::MIN.midnight().assume_utc();
        sprint.start_date = sprint.end_date;
        let plan = generate_sprint(&sprint, &mut StdRng::seed_from_u64(0));
        assert!(plan.tasks.is_empty());
        assert!(plan.milestone_tracking.is_empty());
        assert_eq!(plan.capacity_utilization, 0.0);
    }
}

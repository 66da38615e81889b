use std::collections::BTreeSet;

use rand::Rng;
use time::OffsetDateTime;

use super::{title_case, truncate_chars};
use crate::error::GenerationError;
use crate::fallback::{self, absorb};
use crate::schema::{new_id, ArtifactKind, Status, TicketInput, TicketOutput};
use crate::timestamp;

/// Keyword group and the labels it contributes.
type LabelRule = (&'static [&'static str], &'static [&'static str]);

const STACK_RULES: &[LabelRule] = &[
    (
        &["react", "frontend", "ui", "component"],
        &["frontend", "react", "ui-component"],
    ),
    (
        &["api", "backend", "server", "database"],
        &["backend", "api", "database"],
    ),
    (&["mobile", "ios", "android"], &["mobile", "cross-platform"]),
];

const INTENT_RULES: &[LabelRule] = &[
    (&["bug", "fix", "error", "issue"], &["bug-fix", "maintenance"]),
    (
        &["new", "feature", "enhancement"],
        &["new-feature", "enhancement"],
    ),
    (
        &["performance", "optimization"],
        &["performance", "optimization"],
    ),
    (
        &["security", "auth", "permission"],
        &["security", "authentication"],
    ),
];

const COMPLEXITY_INDICATORS: &[&str] =
    &["integration", "migration", "refactor", "architecture", "algorithm"];
const BASE_COMPLEXITY: u8 = 3;
const MAX_COMPLEXITY: u8 = 10;
const MAX_STORY_POINTS: u32 = 13;

const TECHNICAL_REQUIREMENTS: &[&str] = &[
    "Follow established architecture patterns",
    "Implement proper error handling and logging",
    "Add monitoring and alerting capabilities",
    "Consider scalability and performance implications",
];

/// Lower-cased words separated by single spaces, with a leading space so
/// that `" {keyword}"` matches only at a word start.
struct Scanned(String);

impl Scanned {
    fn new(text: &str) -> Self {
        let mut normalized = String::with_capacity(text.len() + 1);
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            normalized.push(' ');
            normalized.push_str(word);
        }
        Scanned(normalized)
    }

    /// Multi-word and hyphenated keywords match as word sequences.
    fn mentions(&self, keyword: &str) -> bool {
        let needle = Scanned::new(keyword);
        !needle.0.is_empty() && self.0.contains(&needle.0)
    }

    fn mentions_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.mentions(k))
    }
}

/// The caller's title, or the first eight description words title-cased.
pub fn derive_title(input: &TicketInput) -> String {
    if !input.title.trim().is_empty() {
        return input.title.trim().to_string();
    }
    let words: Vec<&str> = input.description.split_whitespace().take(8).collect();
    title_case(&words.join(" "))
}

/// Turn a free-text description into a structured ticket.
///
/// Labels, complexity, risk factors and business value come from keyword
/// scans of the title and description; hours use a random per-point rate.
pub fn generate_ticket<R: Rng + ?Sized>(input: &TicketInput, rng: &mut R) -> TicketOutput {
    absorb(
        ArtifactKind::Ticket,
        build(input, rng, timestamp::now()),
        || fallback::ticket(input),
    )
}

fn build<R: Rng + ?Sized>(
    input: &TicketInput,
    rng: &mut R,
    now: OffsetDateTime,
) -> Result<TicketOutput, GenerationError> {
    let text = Scanned::new(&format!("{} {}", input.title, input.description));

    let mut labels: BTreeSet<String> = input.labels.iter().cloned().collect();
    for (keywords, contributed) in STACK_RULES.iter().chain(INTENT_RULES) {
        if text.mentions_any(keywords) {
            labels.extend(contributed.iter().map(|l| l.to_string()));
        }
    }

    let indicator_count = COMPLEXITY_INDICATORS
        .iter()
        .filter(|k| text.mentions(k))
        .count() as u8;
    let complexity = (BASE_COMPLEXITY + 2 * indicator_count).min(MAX_COMPLEXITY);
    let estimated_hours = u32::from(complexity) * rng.gen_range(2..=4);
    let story_points = (u32::from(complexity) / 2).clamp(1, MAX_STORY_POINTS);

    let mut risk_factors = Vec::new();
    if complexity > 7 {
        risk_factors.push("High complexity may require additional time".to_string());
    }
    if text.mentions_any(&["migration", "breaking change"]) {
        risk_factors.push("Breaking changes may impact existing functionality".to_string());
    }
    if text.mentions_any(&["third-party", "external", "api"]) {
        risk_factors.push("External dependencies may cause delays".to_string());
    }

    let mut business_value: u8 = 5;
    if text.mentions_any(&["user", "customer", "revenue"]) {
        business_value += 2;
    }
    if text.mentions_any(&["critical", "urgent", "production"]) {
        business_value += 2;
    }

    Ok(TicketOutput {
        id: new_id(),
        title: derive_title(input),
        description: user_story(input),
        acceptance_criteria: acceptance_criteria(&input.description),
        labels: labels.into_iter().collect(),
        priority: input.priority,
        status: Status::ToDo,
        estimated_hours,
        story_points,
        assignee_suggestion: "Auto-assign based on workload and expertise matching".to_string(),
        assignee_id: input.assignee_id.clone(),
        epic_link: None,
        sprint_id: None,
        jira_key: None,
        github_issue_url: None,
        dependencies: Vec::new(),
        risk_factors,
        technical_requirements: TECHNICAL_REQUIREMENTS.iter().map(|r| r.to_string()).collect(),
        business_value: business_value.min(10),
        complexity_score: complexity,
        timestamp: now,
    })
}

fn user_story(input: &TicketInput) -> String {
    let context = if input.project_context.trim().is_empty() {
        "General development task"
    } else {
        input.project_context.as_str()
    };
    format!(
        "**User Story:** {description}

**Business Context:** {context}

**Technical Approach:**
- Analyze existing codebase and dependencies
- Design solution following established patterns
- Implement with proper testing strategy
- Review and iterate based on feedback

**Success Criteria:**
- All acceptance criteria met
- Code review approved
- Tests passing with adequate coverage
- Documentation updated
",
        description = input.description,
        context = context,
    )
}

fn acceptance_criteria(description: &str) -> Vec<String> {
    let core = format!(
        "- Implement core functionality: {}...",
        truncate_chars(description, 100)
    );
    [
        "**Functional Requirements:**",
        core.as_str(),
        "- Handle edge cases and error scenarios appropriately",
        "- Ensure backward compatibility with existing features",
        "",
        "**Technical Requirements:**",
        "- Follow established coding standards and patterns",
        "- Include comprehensive unit tests (>90% coverage)",
        "- Add integration tests for critical paths",
        "- Implement proper logging and monitoring",
        "",
        "**Quality Requirements:**",
        "- Code review by senior team member",
        "- Performance testing under expected load",
        "- Security review for data handling",
        "- Accessibility compliance (WCAG 2.1 AA)",
        "",
        "**Documentation Requirements:**",
        "- Update API documentation",
        "- Add user guide sections",
        "- Update technical architecture docs",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

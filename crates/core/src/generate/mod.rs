//! Generation functions, one per artifact kind, plus the dashboard helpers.
//!
//! Each function takes its validated input and explicit dependencies (a
//! gateway handle where AI enrichment applies, a random source where the
//! numbers are simulated) and returns a complete record. Failures inside a
//! generation body go through [`crate::fallback`].

mod blockers;
mod burndown;
mod dashboard;
mod insights;
mod retrospective;
mod sentiment;
mod sprint;
mod standup;
mod ticket;

pub use blockers::{alert_catalog, generate_blockers};
pub use burndown::{simulate_burndown, BURNDOWN_DAYS};
pub use dashboard::{assemble_metrics, CollectionCounts};
pub use insights::canned_insights;
pub use retrospective::{generate_retrospective, team_health_score};
pub use sentiment::{
    analyze_sentiment, default_sentiment, CALL_FAILURE_CONFIDENCE, PARSE_FAILURE_CONFIDENCE,
};
pub use sprint::generate_sprint;
pub use standup::{generate_standup, level_for_score, risk_score};
pub use ticket::{derive_title, generate_ticket};

/// Capitalize the first letter of every whitespace-separated word.
pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max` characters of `text`, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("add  dark MODE"), "Add Dark Mode");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}

use serde::Deserialize;
use time::OffsetDateTime;

use super::sentiment::analyze_sentiment;
use super::title_case;
use crate::error::GenerationError;
use crate::fallback::{self, with_fallback};
use crate::gateway::{call_and_parse, ChatRequest, LlmGateway};
use crate::schema::{
    new_id, ArtifactKind, Level, RiskAssessment, SentimentAnalysis, StandupInput, StandupOutput,
};
use crate::timestamp;

const SYSTEM: &str = "You are an expert AI Scrum Master assistant. Generate professional, \
actionable standup summaries for software development teams.
Focus on:
1. Clear, concise communication
2. Identifying blockers and risks
3. Providing actionable recommendations
4. Maintaining professional tone
5. Highlighting productivity patterns";

/// Scores above this flag the standup as needing attention.
const ATTENTION_THRESHOLD: f64 = 0.6;

/// Weighted local risk heuristic, clamped to `[0, 1]`.
///
/// Base 0.3, plus 0.4 for any blocker, 0.3 for confidence below 5 and 0.2
/// for high stress.
pub fn risk_score(input: &StandupInput, stress: Level) -> f64 {
    let mut score = 0.3;
    if input.has_blockers() {
        score += 0.4;
    }
    if input.confidence_level < 5 {
        score += 0.3;
    }
    if stress == Level::High {
        score += 0.2;
    }
    f64::clamp(score, 0.0, 1.0)
}

/// `>= 0.7` high, `>= 0.4` medium, otherwise low.
pub fn level_for_score(score: f64) -> Level {
    if score >= 0.7 {
        Level::High
    } else if score >= 0.4 {
        Level::Medium
    } else {
        Level::Low
    }
}

#[derive(Debug, Deserialize)]
struct StandupAnalysis {
    summary: Option<String>,
    risk_level: Option<String>,
    risk_reasoning: Option<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    auto_actions: Vec<String>,
}

impl StandupAnalysis {
    /// Used when the model reply is not the requested JSON.
    fn local_default(input: &StandupInput) -> Self {
        StandupAnalysis {
            summary: Some(format!(
                "Daily standup completed by {} with {}/10 confidence level",
                input.team_member_name, input.confidence_level
            )),
            risk_level: Some("medium".to_string()),
            risk_reasoning: Some("Standard development progress".to_string()),
            recommendations: vec![
                "Continue current momentum".to_string(),
                "Monitor for potential blockers".to_string(),
            ],
            auto_actions: vec![
                "Updated team velocity tracking".to_string(),
                "Synced status to project board".to_string(),
            ],
        }
    }
}

/// Summarize a standup with two gateway calls (sentiment, then analysis).
///
/// Fails only when the gateway has no credential; every other failure is
/// replaced by [`fallback::standup`].
pub async fn generate_standup<G: LlmGateway + ?Sized>(
    gateway: &G,
    input: &StandupInput,
) -> Result<StandupOutput, GenerationError> {
    gateway.ensure_configured()?;
    with_fallback(
        ArtifactKind::Standup,
        build(gateway, input, timestamp::now()),
        || fallback::standup(input),
    )
    .await
}

async fn build<G: LlmGateway + ?Sized>(
    gateway: &G,
    input: &StandupInput,
    now: OffsetDateTime,
) -> Result<StandupOutput, GenerationError> {
    let full_text = format!("{} {} {}", input.yesterday, input.today, input.blockers);
    let sentiment = analyze_sentiment(gateway, &full_text).await;

    let request = ChatRequest::new(
        format!("standup_{}_{}", input.team_member_id, new_id()),
        SYSTEM,
        analysis_prompt(input),
    );
    let analysis = call_and_parse(gateway, &request, || StandupAnalysis::local_default(input)).await?;

    let score = risk_score(input, sentiment.stress_level);
    let reported = analysis
        .risk_level
        .as_deref()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::Medium);
    let risk = RiskAssessment {
        risk_level: reported.max(level_for_score(score)),
        risk_score: score,
        risk_factors: if input.has_blockers() {
            vec![input.blockers.clone()]
        } else {
            Vec::new()
        },
        mitigation_suggestions: analysis.recommendations.iter().take(2).cloned().collect(),
    };

    let views = Views {
        input,
        sentiment: &sentiment,
        risk: &risk,
        analysis: &analysis,
        now,
    };

    Ok(StandupOutput {
        id: new_id(),
        team_member_id: input.team_member_id.clone(),
        team_member_name: input.team_member_name.clone(),
        summary: analysis
            .summary
            .clone()
            .unwrap_or_else(|| format!("Daily standup for {}", input.team_member_name)),
        formatted_output: views.formatted()?,
        slack_format: views.slack()?,
        markdown_format: views.markdown()?,
        jira_format: views.jira()?,
        sentiment_analysis: sentiment.clone(),
        risk_assessment: risk.clone(),
        recommendations: analysis.recommendations.clone(),
        auto_actions: analysis.auto_actions.clone(),
        timestamp: now,
    })
}

fn analysis_prompt(input: &StandupInput) -> String {
    let blockers = if input.has_blockers() {
        input.blockers.as_str()
    } else {
        "None reported"
    };
    format!(
        "Generate a comprehensive standup analysis for team member: {name}

Yesterday's Work: {yesterday}
Today's Plans: {today}
Blockers: {blockers}
Confidence Level: {confidence}/10
Mood: {mood}

Provide:
1. Professional summary (2-3 sentences)
2. Risk assessment (low/medium/high with reasoning)
3. 2-3 specific recommendations
4. 2-3 potential auto-actions

Format as JSON with keys: summary, risk_level, risk_reasoning, recommendations, auto_actions",
        name = input.team_member_name,
        yesterday = input.yesterday,
        today = input.today,
        blockers = blockers,
        confidence = input.confidence_level,
        mood = input.mood,
    )
}

/// Audience-specific renderings of one standup.
struct Views<'a> {
    input: &'a StandupInput,
    sentiment: &'a SentimentAnalysis,
    risk: &'a RiskAssessment,
    analysis: &'a StandupAnalysis,
    now: OffsetDateTime,
}

impl Views<'_> {
    fn date(&self, field: &str) -> Result<String, GenerationError> {
        timestamp::iso_date(self.now).map_err(|e| GenerationError::render(field, e))
    }

    fn formatted(&self) -> Result<String, GenerationError> {
        let input = self.input;
        let date = timestamp::long_date(self.now)
            .map_err(|e| GenerationError::render("formatted_output", e))?;
        let blockers = if input.has_blockers() {
            format!("\u{2022} {}", input.blockers)
        } else {
            "\u{2022} No blockers reported".to_string()
        };
        let status = if self.risk.risk_score > ATTENTION_THRESHOLD {
            "\u{26a0}\u{fe0f} Attention needed"
        } else {
            "\u{2705} On track for sprint goals"
        };
        Ok(format!(
            "**Daily Standup Summary - {date}**
**Team Member:** {name}

**Yesterday's Accomplishments:**
\u{2022} {yesterday}

**Today's Focus:**
\u{2022} {today}

**Blockers & Challenges:**
{blockers}

**Team Member Status:**
\u{2022} Confidence Level: {confidence}/10
\u{2022} Mood: {mood}
\u{2022} Sentiment: {sentiment}

**AI Risk Assessment:**
\u{2022} Risk Level: {risk}
\u{2022} {reasoning}

**Status:** {status}
",
            date = date,
            name = input.team_member_name,
            yesterday = input.yesterday,
            today = input.today,
            blockers = blockers,
            confidence = input.confidence_level,
            mood = title_case(&input.mood),
            sentiment = self.sentiment.sentiment.title(),
            risk = self.risk.risk_level.title(),
            reasoning = self
                .analysis
                .risk_reasoning
                .as_deref()
                .unwrap_or("Standard progress tracking"),
            status = status,
        ))
    }

    fn slack(&self) -> Result<String, GenerationError> {
        let input = self.input;
        let date =
            timestamp::long_date(self.now).map_err(|e| GenerationError::render("slack_format", e))?;
        let blockers = if input.has_blockers() {
            format!("\u{1f6ab} *Blockers:* {}", input.blockers)
        } else {
            "\u{2728} *Status:* No blockers".to_string()
        };
        let insight = self
            .analysis
            .recommendations
            .first()
            .map(String::as_str)
            .unwrap_or("Team performing well");
        Ok(format!(
            "\u{1f5d3}\u{fe0f} *Daily Standup - {date}*
\u{1f464} *{name}*

\u{2705} *Yesterday:* {yesterday}
\u{1f3af} *Today:* {today}
{blockers}

\u{1f4ca} *Metrics:* {confidence}/10 confidence | *Mood:* {mood} | *Risk:* {risk}

\u{1f916} *AI Insight:* {insight}

_Auto-generated by ScrumPilot_",
            date = date,
            name = input.team_member_name,
            yesterday = input.yesterday,
            today = input.today,
            blockers = blockers,
            confidence = input.confidence_level,
            mood = input.mood,
            risk = self.risk.risk_level,
            insight = insight,
        ))
    }

    fn markdown(&self) -> Result<String, GenerationError> {
        let input = self.input;
        let date = self.date("markdown_format")?;
        let generated_at = timestamp::iso_datetime(self.now)
            .map_err(|e| GenerationError::render("markdown_format", e))?;
        let recommendations = self
            .analysis
            .recommendations
            .iter()
            .map(|r| format!("- {}", r))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!(
            "# Daily Standup - {date}
## Team Member: {name}

## Yesterday's Work
{yesterday}

## Today's Plan
{today}

## Blockers
{blockers}

## Team Metrics
- **Confidence Level:** {confidence}/10
- **Mood:** {mood}
- **Risk Assessment:** {risk}
- **Sentiment:** {sentiment}

## AI Recommendations
{recommendations}

---
*Generated on {generated_at} by ScrumPilot*
",
            date = date,
            name = input.team_member_name,
            yesterday = input.yesterday,
            today = input.today,
            blockers = if input.has_blockers() {
                input.blockers.as_str()
            } else {
                "No blockers reported"
            },
            confidence = input.confidence_level,
            mood = input.mood,
            risk = self.risk.risk_level,
            sentiment = self.sentiment.sentiment,
            recommendations = recommendations,
            generated_at = generated_at,
        ))
    }

    fn jira(&self) -> Result<String, GenerationError> {
        let input = self.input;
        let date = self.date("jira_format")?;
        let recommendations = self
            .analysis
            .recommendations
            .iter()
            .map(|r| format!("* {}", r))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!(
            "[STANDUP] {date} - {name}

h3. Progress Update
* Yesterday: {yesterday}
* Today: {today}
* Blockers: {blockers}

h3. Metrics
* Confidence: {confidence}/10
* Risk Level: {risk}
* Sentiment: {sentiment}

h3. AI Recommendations
{recommendations}
",
            date = date,
            name = input.team_member_name,
            yesterday = input.yesterday,
            today = input.today,
            blockers = if input.has_blockers() {
                input.blockers.as_str()
            } else {
                "None"
            },
            confidence = input.confidence_level,
            risk = self.risk.risk_level,
            sentiment = self.sentiment.sentiment,
            recommendations = recommendations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::testing::{FailingGateway, MockGateway, UnconfiguredGateway};
    use crate::schema::Sentiment;
    use serde_json::json;

    const CALM: &str =
        r#"{"sentiment": "positive", "confidence": 0.8, "mood_indicators": ["upbeat"], "stress_level": "low"}"#;
    const ANALYSIS: &str = r#"```json
{"summary": "Ada shipped the login form.", "risk_level": "low",
 "risk_reasoning": "Work is flowing", "recommendations": ["Pair on review", "Write docs", "Demo"],
 "auto_actions": ["Moved LOGIN-1 to review"]}
```"#;

    fn input(blockers: &str, confidence: u8) -> StandupInput {
        serde_json::from_value(json!({
            "team_member_id": "u1",
            "team_member_name": "Ada",
            "yesterday": "Built the login form",
            "today": "Wire it to the API",
            "blockers": blockers,
            "mood": "happy",
            "confidence_level": confidence
        }))
        .unwrap()
    }

    #[test]
    fn blocked_low_confidence_scores_higher() {
        for stress in [Level::Low, Level::Medium, Level::High] {
            for low in 1..=3 {
                let blocked = risk_score(&input("API down", low), stress);
                let clear = risk_score(&input("", 9), stress);
                assert!(blocked > clear, "stress {:?} confidence {}", stress, low);
            }
        }
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(risk_score(&input("API down", 1), Level::High), 1.0);
        assert!((risk_score(&input("", 9), Level::Low) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn levels_follow_thresholds() {
        assert_eq!(level_for_score(0.3), Level::Low);
        assert_eq!(level_for_score(0.4), Level::Medium);
        assert_eq!(level_for_score(0.7), Level::High);
    }

    #[tokio::test]
    async fn renders_the_model_analysis() {
        let gateway = MockGateway::replying(&[CALM, ANALYSIS]);
        let out = generate_standup(&gateway, &input("", 8)).await.unwrap();
        assert_eq!(gateway.calls(), 2);
        assert_eq!(out.summary, "Ada shipped the login form.");
        assert_eq!(out.sentiment_analysis.sentiment, Sentiment::Positive);
        assert_eq!(out.risk_assessment.risk_level, Level::Low);
        assert_eq!(out.risk_assessment.mitigation_suggestions.len(), 2);
        assert!(out.risk_assessment.risk_factors.is_empty());
        assert_eq!(out.auto_actions, vec!["Moved LOGIN-1 to review"]);
        assert!(out.formatted_output.contains("**Team Member:** Ada"));
        assert!(out.formatted_output.contains("Mood: Happy"));
        assert!(out.formatted_output.contains("On track for sprint goals"));
        assert!(out.slack_format.contains("*AI Insight:* Pair on review"));
        assert!(out.markdown_format.contains("- Write docs"));
        assert!(out.jira_format.starts_with("[STANDUP] "));
        assert!(out.jira_format.contains("* Blockers: None"));
    }

    #[tokio::test]
    async fn blocked_standup_is_never_low_risk() {
        let gateway = MockGateway::replying(&[CALM, ANALYSIS]);
        let out = generate_standup(&gateway, &input("API down", 2)).await.unwrap();
        assert_eq!(out.risk_assessment.risk_level, Level::High);
        assert_eq!(out.risk_assessment.risk_score, 1.0);
        assert_eq!(out.risk_assessment.risk_factors, vec!["API down"]);
        assert!(out.formatted_output.contains("Attention needed"));
        assert!(out.slack_format.contains("*Blockers:* API down"));
    }

    #[tokio::test]
    async fn prose_analysis_uses_local_default() {
        let gateway = MockGateway::replying(&["not json", "also not json"]);
        let out = generate_standup(&gateway, &input("API down", 2)).await.unwrap();
        assert_eq!(
            out.summary,
            "Daily standup completed by Ada with 2/10 confidence level"
        );
        assert_eq!(
            out.recommendations,
            vec!["Continue current momentum", "Monitor for potential blockers"]
        );
        assert_eq!(out.sentiment_analysis.confidence, 0.7);
        assert!(matches!(
            out.risk_assessment.risk_level,
            Level::High | Level::Medium
        ));
    }

    #[tokio::test]
    async fn failing_gateway_falls_back_to_constants() {
        let out = generate_standup(&FailingGateway, &input("API down", 2))
            .await
            .unwrap();
        let expected = fallback::standup(&input("API down", 2));
        assert_eq!(out.summary, expected.summary);
        assert_eq!(out.risk_assessment, expected.risk_assessment);
        assert_eq!(out.sentiment_analysis, expected.sentiment_analysis);
        assert_eq!(out.formatted_output, expected.formatted_output);
    }

    #[tokio::test]
    async fn analysis_call_failure_alone_triggers_fallback() {
        let gateway = MockGateway::new(vec![
            Ok(CALM.to_string()),
            Err(GatewayError::Upstream("502".into())),
        ]);
        let out = generate_standup(&gateway, &input("", 8)).await.unwrap();
        assert_eq!(out.summary, "Daily standup completed by Ada");
        assert_eq!(out.recommendations, vec!["Continue current work"]);
    }

    #[tokio::test]
    async fn unconfigured_gateway_is_an_error() {
        let err = generate_standup(&UnconfiguredGateway, &input("", 8))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn fallback_is_idempotent() {
        let first = generate_standup(&FailingGateway, &input("", 8)).await.unwrap();
        let second = generate_standup(&FailingGateway, &input("", 8)).await.unwrap();
        let strip = |o: &StandupOutput| {
            let mut v = serde_json::to_value(o).unwrap();
            v.as_object_mut().unwrap().remove("id");
            v.as_object_mut().unwrap().remove("timestamp");
            v
        };
        assert_ne!(first.id, second.id);
        assert_eq!(strip(&first), strip(&second));
    }
}

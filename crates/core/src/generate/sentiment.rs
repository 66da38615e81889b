use serde::Deserialize;

use crate::gateway::{call_and_parse, ChatRequest, LlmGateway};
use crate::schema::{new_id, Level, SentimentAnalysis, Sentiment};

/// Confidence reported when the model replied but not with usable JSON.
pub const PARSE_FAILURE_CONFIDENCE: f64 = 0.7;
/// Confidence reported when the gateway call itself failed.
pub const CALL_FAILURE_CONFIDENCE: f64 = 0.5;

const SYSTEM: &str = "You are a sentiment analysis expert. Analyze the emotional tone and \
sentiment of team communications. Respond with a JSON object containing: sentiment \
(positive/neutral/negative), confidence (0-1), mood_indicators (array), and stress_level \
(low/medium/high).";

/// Neutral reading with medium stress.
pub fn default_sentiment(confidence: f64) -> SentimentAnalysis {
    SentimentAnalysis {
        sentiment: Sentiment::Neutral,
        confidence,
        mood_indicators: vec!["neutral".to_string()],
        stress_level: Level::Medium,
    }
}

/// Reply shape; every key optional so partial replies still count.
#[derive(Debug, Deserialize)]
struct SentimentReply {
    sentiment: Option<String>,
    confidence: Option<f64>,
    mood_indicators: Option<Vec<String>>,
    stress_level: Option<String>,
}

impl SentimentReply {
    fn into_analysis(self) -> SentimentAnalysis {
        SentimentAnalysis {
            sentiment: self
                .sentiment
                .and_then(|s| s.parse().ok())
                .unwrap_or(Sentiment::Neutral),
            confidence: self
                .confidence
                .filter(|c| c.is_finite())
                .map(|c| c.clamp(0.0, 1.0))
                .unwrap_or(PARSE_FAILURE_CONFIDENCE),
            mood_indicators: self.mood_indicators.unwrap_or_default(),
            stress_level: self
                .stress_level
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::Medium),
        }
    }
}

/// Ask the model for a sentiment reading of `text`.
///
/// Never fails: an unparseable reply yields the neutral default at
/// [`PARSE_FAILURE_CONFIDENCE`], a failed call the neutral default at
/// [`CALL_FAILURE_CONFIDENCE`].
pub async fn analyze_sentiment<G: LlmGateway + ?Sized>(
    gateway: &G,
    text: &str,
) -> SentimentAnalysis {
    let request = ChatRequest::new(
        format!("sentiment_{}", new_id()),
        SYSTEM,
        format!(
            "Analyze the sentiment of this team member's standup update: {}",
            text
        ),
    );
    let parsed = call_and_parse(gateway, &request, || None::<SentimentReply>).await;
    match parsed {
        Ok(Some(reply)) => reply.into_analysis(),
        Ok(None) => default_sentiment(PARSE_FAILURE_CONFIDENCE),
        Err(e) => {
            tracing::error!(error = %e, "sentiment analysis failed");
            default_sentiment(CALL_FAILURE_CONFIDENCE)
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;

use super::{ChatRequest, LlmGateway};
use crate::error::GatewayError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    /// `None` or blank means unconfigured.
    pub api_key: Option<String>,
    pub model: String,
    /// Without the trailing `/chat/completions`.
    pub base_url: String,
    pub max_tokens: u32,
    /// Upper bound on a whole call, connect to last byte.
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Gateway backed by `POST {base_url}/chat/completions`.
///
/// Uses `ureq` for HTTP on the blocking pool.
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    config: OpenAiConfig,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Self {
        OpenAiGateway { config }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(GatewayError::Configuration(
                "no API key set (llm.api_key or OPENAI_API_KEY)".to_string(),
            )),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, request: &ChatRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "user": request.session_id,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.prompt},
            ],
        })
    }
}

/// `choices[0].message.content`
fn extract_content(response: &serde_json::Value) -> Result<String, GatewayError> {
    response["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Upstream("no message content in completion".to_string()))
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    fn ensure_configured(&self) -> Result<(), GatewayError> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        let api_key = self.api_key()?.to_string();
        let url = self.endpoint();
        let body = self.request_body(request);
        let timeout = self.config.timeout;

        tracing::debug!(
            session = %request.session_id,
            model = %self.config.model,
            "sending chat completion"
        );

        // ureq is synchronous
        tokio::task::spawn_blocking(move || {
            let agent: ureq::Agent = ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .build()
                .into();
            let response = agent
                .post(&url)
                .header("authorization", &format!("Bearer {}", api_key))
                .header("content-type", "application/json")
                .send_json(body)
                .map_err(|e| GatewayError::Upstream(e.to_string()))?;
            let json: serde_json::Value = response.into_body().read_json().map_err(|e| {
                GatewayError::Upstream(format!("unreadable completion body: {}", e))
            })?;
            extract_content(&json)
        })
        .await
        .map_err(|e| GatewayError::Upstream(format!("task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> OpenAiGateway {
        OpenAiGateway::new(OpenAiConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://127.0.0.1:9/v1/".into(),
            ..OpenAiConfig::default()
        })
    }

    #[test]
    fn blank_key_is_unconfigured() {
        for key in [None, Some("".to_string()), Some("   ".to_string())] {
            let gateway = OpenAiGateway::new(OpenAiConfig {
                api_key: key,
                ..OpenAiConfig::default()
            });
            assert!(matches!(
                gateway.ensure_configured(),
                Err(GatewayError::Configuration(_))
            ));
        }
        assert!(configured().ensure_configured().is_ok());
    }

    #[tokio::test]
    async fn unconfigured_call_fails_before_network() {
        let gateway = OpenAiGateway::new(OpenAiConfig::default());
        let err = gateway
            .complete(&ChatRequest::new("s", "sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_upstream_error() {
        let err = configured()
            .complete(&ChatRequest::new("s", "sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Upstream(_)));
    }

    #[test]
    fn builds_chat_completions_request() {
        let gateway = configured();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
        let body = gateway.request_body(&ChatRequest::new("s-1", "be terse", "hello"));
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["user"], "s-1");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn extracts_first_choice_content() {
        let reply = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}}]
        });
        assert_eq!(extract_content(&reply).unwrap(), "{\"ok\":true}");
        assert!(extract_content(&serde_json::json!({"choices": []})).is_err());
    }
}

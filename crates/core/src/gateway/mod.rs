//! LLM gateway: the one networked dependency of the generation functions.
//!
//! A gateway takes a session id, a system instruction and a user prompt and
//! returns the model's raw reply. [`call_and_parse`] is the shared
//! "ask for JSON, else use a local default" combinator every generation
//! function goes through.

#[cfg(feature = "openai")]
mod openai;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiGateway};

/// One prompt in a fresh chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub session_id: String,
    pub system: String,
    pub prompt: String,
}

impl ChatRequest {
    pub fn new(
        session_id: impl Into<String>,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        ChatRequest {
            session_id: session_id.into(),
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

/// Chat-completion backend.
///
/// Implementations make a single attempt per call: no retries and no
/// caching.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Fails with [`GatewayError::Configuration`] when no credential is set.
    /// Never touches the network.
    fn ensure_configured(&self) -> Result<(), GatewayError>;

    /// Send one prompt and return the raw reply text.
    ///
    /// Raises `Configuration` before any network attempt when unconfigured,
    /// and `Upstream` on transport failure, non-success status, timeout, or a
    /// reply with no text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError>;
}

/// Strip markdown code fences (```json ... ```) from a model reply.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with("```") {
        let after_open = match text.find('\n') {
            Some(nl) => &text[nl + 1..],
            None => return text,
        };
        if let Some(close) = after_open.rfind("```") {
            return after_open[..close].trim();
        }
        return after_open.trim();
    }
    text
}

/// Parse a reply as `T`, tolerating code fences.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fences(reply))
}

/// Call the gateway and parse the reply as `T`.
///
/// A reply that does not parse is replaced by `default()`; that is a local
/// default for this one sub-result, not the artifact fallback. Gateway
/// errors are returned to the caller unchanged.
pub async fn call_and_parse<T, G>(
    gateway: &G,
    request: &ChatRequest,
    default: impl FnOnce() -> T,
) -> Result<T, GatewayError>
where
    T: DeserializeOwned,
    G: LlmGateway + ?Sized,
{
    let reply = gateway.complete(request).await?;
    match parse_reply(&reply) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::warn!(
                session = %request.session_id,
                error = %e,
                "model reply was not the requested JSON, using default"
            );
            Ok(default())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Gateway doubles shared by the generation tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Pops canned replies in order; records every request.
    pub struct MockGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockGateway {
        pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            MockGateway {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(replies: &[&str]) -> Self {
            MockGateway::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        fn ensure_configured(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Upstream("no canned reply left".into())))
        }
    }

    /// Configured, but every call fails upstream.
    pub struct FailingGateway;

    #[async_trait]
    impl LlmGateway for FailingGateway {
        fn ensure_configured(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn complete(&self, _request: &ChatRequest) -> Result<String, GatewayError> {
            Err(GatewayError::Upstream("connection refused".into()))
        }
    }

    /// No credential.
    pub struct UnconfiguredGateway;

    #[async_trait]
    impl LlmGateway for UnconfiguredGateway {
        fn ensure_configured(&self) -> Result<(), GatewayError> {
            Err(GatewayError::Configuration("no API key set".into()))
        }

        async fn complete(&self, _request: &ChatRequest) -> Result<String, GatewayError> {
            Err(GatewayError::Configuration("no API key set".into()))
        }
    }
}

//! Error taxonomy shared by the gateway, the generation functions and the
//! schema layer.

/// Errors raised by an [`LlmGateway`](crate::LlmGateway) call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No credential configured. Raised before any network attempt.
    #[error("LLM gateway is not configured: {0}")]
    Configuration(String),

    /// Network failure, non-success response, timeout, or an unusable body.
    #[error("LLM upstream error: {0}")]
    Upstream(String),
}

/// Errors a generation body may raise.
///
/// Everything except `Configuration` is absorbed by the fallback policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    /// A derived field could not be computed or rendered.
    #[error("failed to render {field}: {message}")]
    Render { field: String, message: String },
}

impl GenerationError {
    pub fn render(field: &str, message: impl ToString) -> Self {
        GenerationError::Render {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerationError::Configuration(_))
    }
}

impl From<GatewayError> for GenerationError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Configuration(_) => GenerationError::Configuration(err.to_string()),
            GatewayError::Upstream(_) => GenerationError::Upstream(err.to_string()),
        }
    }
}

/// Malformed caller input, rejected before any generation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_keep_their_class() {
        let config: GenerationError = GatewayError::Configuration("no key".into()).into();
        let upstream: GenerationError = GatewayError::Upstream("timeout".into()).into();
        assert!(config.is_configuration());
        assert!(!upstream.is_configuration());
        assert!(config.to_string().contains("no key"));
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = ValidationError::new("confidence_level", "must be between 1 and 10");
        assert_eq!(
            err.to_string(),
            "invalid confidence_level: must be between 1 and 10"
        );
    }
}

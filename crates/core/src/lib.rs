//! ScrumPilot core: artifact schemas and the generation-with-fallback contract.
//!
//! Every artifact (standup, ticket, sprint plan, blocker report,
//! retrospective) is produced by a generation function that takes its input
//! record plus explicit dependencies (an [`LlmGateway`] handle, a random
//! source) and always returns a schema-complete record. Generation-time
//! failures are absorbed by the [`fallback`] policy; only a missing gateway
//! credential escapes as [`GenerationError::Configuration`].

pub mod error;
pub mod export;
pub mod fallback;
pub mod gateway;
pub mod generate;
pub mod schema;
pub mod timestamp;

pub use error::{GatewayError, GenerationError, ValidationError};
pub use gateway::{call_and_parse, ChatRequest, LlmGateway};
pub use schema::{ArtifactKind, Validate};

#[cfg(feature = "openai")]
pub use gateway::{OpenAiConfig, OpenAiGateway};

/// Product version reported by the health endpoint.
pub const SCRUMPILOT_VERSION: &str = env!("CARGO_PKG_VERSION");

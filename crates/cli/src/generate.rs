//! `scrumpilot generate`: one-shot generation from a JSON input file.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde_json::Value;

use scrumpilot_core::generate::{
    generate_blockers, generate_retrospective, generate_sprint, generate_standup,
    generate_ticket,
};
use scrumpilot_core::schema::{
    BlockerInput, RetrospectiveInput, SprintInput, StandupInput, TicketInput,
};
use scrumpilot_core::{GenerationError, OpenAiGateway, Validate, ValidationError};

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Artifact {
    Standup,
    Ticket,
    Sprint,
    Blockers,
    Retrospective,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum CommandError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

fn read_input<T: DeserializeOwned + Validate>(path: &Path) -> Result<T, CommandError> {
    let text = fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let input: T = serde_json::from_str(&text)?;
    input.validate()?;
    Ok(input)
}

/// Validate the input file, generate the artifact and return it as JSON.
///
/// `seed` pins the random source of the simulated analytics.
pub(crate) async fn run(
    artifact: Artifact,
    input: &Path,
    seed: Option<u64>,
    settings: &Settings,
) -> Result<Value, CommandError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let record = match artifact {
        Artifact::Standup => {
            let input: StandupInput = read_input(input)?;
            let gateway = OpenAiGateway::new(settings.llm.gateway_config());
            serde_json::to_value(generate_standup(&gateway, &input).await?)?
        }
        Artifact::Ticket => {
            let input: TicketInput = read_input(input)?;
            serde_json::to_value(generate_ticket(&input, &mut rng))?
        }
        Artifact::Sprint => {
            let input: SprintInput = read_input(input)?;
            serde_json::to_value(generate_sprint(&input, &mut rng))?
        }
        Artifact::Blockers => {
            let input: BlockerInput = read_input(input)?;
            serde_json::to_value(generate_blockers(&input, &mut rng))?
        }
        Artifact::Retrospective => {
            let input: RetrospectiveInput = read_input(input)?;
            serde_json::to_value(generate_retrospective(&input, &mut rng))?
        }
    };
    tracing::debug!(?artifact, "generated");
    Ok(record)
}

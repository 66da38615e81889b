mod config;
mod generate;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::generate::Artifact;

/// ScrumPilot: AI-assisted scrum artifacts.
#[derive(Parser)]
#[command(name = "scrumpilot", version, about = "AI-assisted scrum artifacts")]
struct Cli {
    /// Log at debug level (overridden by SCRUMPILOT_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API with an in-memory store
    Serve {
        /// Address to bind (default from config: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default from config: 8001)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate one artifact from a JSON input file and print it
    Generate {
        /// Artifact kind to generate
        #[arg(value_enum)]
        artifact: Artifact,
        /// Path to the input JSON file
        #[arg(long)]
        input: PathBuf,
        /// Seed for the simulated analytics
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("SCRUMPILOT_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("warning: failed to initialize logging: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Err(e) = rt.block_on(serve::start_server(&settings)) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
        Commands::Generate {
            artifact,
            input,
            seed,
        } => match rt.block_on(generate::run(artifact, &input, seed, &settings)) {
            Ok(record) => match serde_json::to_string_pretty(&record) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
    }
}

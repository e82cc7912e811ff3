use std::process::ExitCode;

use clap::Parser;
use extractpatch::cli::apply::ApplyCommandOutput;
use extractpatch::cli::{Cli, Commands};
use extractpatch::error::ExtractPatchError;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "extractpatch failed");
            let serialized = serde_json::to_string_pretty(&error.to_error_response()).unwrap_or_else(
                |_| {
                    "{\"error\":{\"type\":\"serialization_error\",\"message\":\"Failed to serialize error response\"}}"
                        .to_string()
                },
            );
            println!("{serialized}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("EXTRACTPATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<String, ExtractPatchError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply(args) => {
            let output = extractpatch::cli::apply::run_apply(args, |line| println!("{line}"))?;
            match output {
                ApplyCommandOutput::Text(output) => Ok(output),
                ApplyCommandOutput::Json(response) => serde_json::to_string_pretty(&response)
                    .map_err(|source| ExtractPatchError::ResponseSerialization { source }),
            }
        }
        Commands::Rules(args) => {
            let response = extractpatch::cli::rules::run_rules(args);
            serde_json::to_string_pretty(&response)
                .map_err(|source| ExtractPatchError::ResponseSerialization { source })
        }
    }
}

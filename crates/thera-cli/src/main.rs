//! Thera worker - process one chunk of the pending extraction set.

use clap::Parser;
use std::process::ExitCode;
use thera_cli::{commands, Cli, Formatter, Mode, WorkerConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout is reserved for the summary line and reports
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let formatter = Formatter::new(cli.format.into(), !cli.no_color);
    let mode = cli.mode();

    match run(cli, &formatter).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %e, "Worker aborted");
            // Run mode always leaves one summary line for the scheduler
            if let Mode::Run { start_index, .. } = mode {
                println!("{}", commands::RunOutcome::aborted(start_index, &e).summary.to_json_line());
            }
            eprintln!("{}", formatter.error(&e.to_string()));
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, formatter: &Formatter) -> thera_cli::Result<u8> {
    let mut config = WorkerConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.endpoint.clone(), cli.model.clone());
    config.validate()?;

    match cli.mode() {
        Mode::Plan(workers) => {
            println!("{}", commands::execute_plan(workers, &config, formatter)?);
            Ok(0)
        }
        Mode::Status => {
            println!("{}", commands::execute_status(&config, formatter)?);
            Ok(0)
        }
        Mode::Run {
            start_index,
            batch_size,
        } => {
            let outcome = commands::execute_run(start_index, batch_size, &config).await?;
            println!("{}", outcome.summary.to_json_line());
            if let Some(reason) = &outcome.expired {
                eprintln!("{}", formatter.warning(&format!("Session expired: {}", reason)));
            } else if !outcome.summary.is_success() {
                eprintln!(
                    "{}",
                    formatter.warning(&format!("{} item(s) failed; rerun to retry them", outcome.summary.failed))
                );
            } else {
                eprintln!("{}", formatter.success(&format!("Chunk done: {} processed", outcome.summary.processed)));
            }
            Ok(outcome.exit_code())
        }
    }
}

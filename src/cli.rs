use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::args::ArgMap;
use crate::error::AppError;
use crate::pipeline::report::RunReport;
use crate::workflow::{self, Tool};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Entry point shared by the binaries: parse `--key=value` arguments, run the
/// tool and turn the outcome into an exit status.
pub async fn main(tool: Tool) -> ExitCode {
    init_tracing();

    let args = ArgMap::from_env();
    let outcome = run(tool, &args).await;
    ExitCode::from(exit_status(tool, &outcome))
}

/// Log the outcome of a run and pick the process exit status: 0 on success,
/// 1 on any error.
pub fn exit_status(tool: Tool, outcome: &anyhow::Result<RunReport>) -> u8 {
    match outcome {
        Ok(report) => {
            tracing::info!(
                updated = report.updated,
                failed = report.failed,
                elapsed_secs = report.elapsed_secs(),
                "Processed total issues: {}",
                report.updated
            );
            0
        }
        Err(e) => {
            tracing::error!("{e:#}");
            match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) => eprintln!("{}", tool.usage()),
                Some(AppError::RetriesExhausted { updated, .. }) => {
                    tracing::info!("Processed total issues: {updated}");
                }
                _ => {}
            }
            1
        }
    }
}

async fn run(tool: Tool, args: &ArgMap) -> anyhow::Result<RunReport> {
    let report = workflow::run_tool(tool, args)
        .await
        .with_context(|| format!("{} failed", tool.name()))?;
    Ok(report)
}

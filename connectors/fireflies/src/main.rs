use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use fireflies_transcripts::{FirefliesConfig, TranscriptManager};
use shared::telemetry::{self, TelemetryConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "fireflies-transcripts",
    version,
    about = "Download or delete Fireflies.ai meeting transcripts"
)]
struct Cli {
    /// Directory holding the transcript JSON files (overrides OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Maximum number of concurrent delete requests (overrides DELETE_CONCURRENCY)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all remote transcripts and save them as JSON files
    Fetch,
    /// Delete, on Fireflies, every transcript saved locally
    Delete,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();

    let cli = Cli::parse();

    let telemetry_config = TelemetryConfig::from_env("fireflies-transcripts");
    telemetry::init_telemetry(telemetry_config)?;

    let mut config = match FirefliesConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(n) = cli.concurrency {
        config.delete_concurrency = n.max(1);
    }

    let manager = TranscriptManager::new(config)?;

    match cli.command {
        Command::Fetch => match manager.fetch().await {
            Ok(written) => {
                info!("Saved {} transcript file(s)", written.len());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                error!("{:#}", e);
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Delete => {
            let cancelled = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&cancelled);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, letting in-flight deletions finish");
                    flag.store(true, Ordering::SeqCst);
                }
            });

            match manager.delete(&cancelled).await {
                Ok(summary) if summary.has_failures() => {
                    error!("{} transcript deletion(s) failed", summary.failed());
                    Ok(ExitCode::FAILURE)
                }
                Ok(_) => Ok(ExitCode::SUCCESS),
                Err(e) => {
                    error!("{:#}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

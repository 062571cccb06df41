mod constants;
mod error;
mod locate;
mod modes;
mod output;
mod session;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};

use modes::Mode;
use output::OutputFormat;
use session::CachedSession;

#[derive(Parser, Debug)]
#[command(name = "pydoc_scraper", about = "Python documentation scraper")]
struct Cli {
    /// Extraction routine to run
    #[arg(value_enum)]
    mode: Mode,

    /// Clear the response cache before running
    #[arg(short, long)]
    clear_cache: bool,

    /// Extra output rendering (default: plain lines on stdout)
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("scraper started");
    let t0 = Instant::now();
    let code = match Cli::try_parse() {
        Ok(cli) => {
            info!(?cli, "command line arguments");
            match run(&cli).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("scraper failed: {err:?}");
                    ExitCode::FAILURE
                }
            }
        }
        // --help and --version land here too; only genuine argument
        // errors count as a failed run.
        Err(err) => {
            let failed = err.use_stderr();
            let _ = err.print();
            if failed {
                error!("scraper failed: invalid command line arguments");
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    };
    // Completion marker is logged even after a failure.
    info!("scraper finished in {:.1}s", t0.elapsed().as_secs_f64());
    code
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let session = CachedSession::new()?;
    if cli.clear_cache {
        session.clear()?;
    }
    if let Some(table) = modes::run(cli.mode, &session).await? {
        output::render(&table, cli.mode.name(), cli.output)?;
    }
    Ok(())
}

use clap::{ArgAction, Parser};
use color_eyre::eyre::eyre;
use commands::export::{self, ExportArgs};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser, Debug)]
#[command(name = "mubi-export")]
#[command(about = "Export a MUBI user's watchlist and ratings to CSV")]
#[command(version)]
struct Cli {
    /// Numeric MUBI user id (the number in https://mubi.com/en/users/<id>)
    #[arg(value_parser = export::parse_user_id)]
    user_id: String,

    /// Bearer token for private lists
    #[arg(long, env = "MUBI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Items requested per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    per_page: Option<u32>,

    /// Two-letter country code sent with every request
    #[arg(long, value_name = "CODE")]
    country: Option<String>,

    /// Also write Letterboxd-compatible CSV files
    #[arg(long, action = ArgAction::SetTrue)]
    letterboxd: bool,

    /// Log request and response details
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Config file (defaults to <config dir>/mubi-export/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the CSV files are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl From<Cli> for ExportArgs {
    fn from(cli: Cli) -> Self {
        Self {
            user_id: cli.user_id,
            token: cli.token,
            per_page: cli.per_page,
            country: cli.country,
            letterboxd: cli.letterboxd,
            debug: cli.debug,
            config: cli.config,
            output_dir: cli.output_dir,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_guard = logging::init_logging(cli.debug, cli.quiet, cli.log_file.clone())
        .map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let succeeded = export::run_export(cli.into(), &output).await?;
    if !succeeded {
        // Flush file logs before exiting
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

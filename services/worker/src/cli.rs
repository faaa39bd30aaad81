use clap::{Parser, Subcommand};

use crate::daemon::{self, ServeArgs};
use crate::demo::{run_once, run_rate, RateArgs};
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Food Insight Worker",
    about = "Run the health-rating batch scheduler or rate products from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch scheduler and cache sweep until interrupted (default)
    Serve(ServeArgs),
    /// Execute a single batch pass over the seeded catalog and print the report
    Once,
    /// Rate seeded products through the engine and print the results
    Rate(RateArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => daemon::run(args).await,
        Command::Once => run_once().await,
        Command::Rate(args) => run_rate(args),
    }
}

use clap::{Args, Parser, Subcommand};
use flightline::error::AppError;

use crate::demo::{run_assess, run_demo, AssessArgs, DemoArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Flightline Preflight Desk",
    about = "Run the preflight risk assessment service and scoring tools from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a catalog and response file once and print the verdict
    Assess(AssessArgs),
    /// Run an end-to-end CLI demo over the seeded catalog
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Demo(args) => run_demo(args),
    }
}

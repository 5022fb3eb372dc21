use crate::demo::{run_decide, run_demo, DecideArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use financing_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Financing Intake",
    about = "Validate financing applications and decide PASS or REFER from the command line",
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
    /// Validate one application and print its decision
    Decide(DecideArgs),
    /// Walk the application wizard for sample applicants
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
        Command::Decide(args) => run_decide(args),
        Command::Demo(args) => run_demo(args),
    }
}

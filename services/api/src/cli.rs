use crate::demo::{run_demo, run_scan, DemoArgs, ScanArgs};
use crate::server;
use casework::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Casework Duplicate Review",
    about = "Find and merge duplicate applicant records from the command line",
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
    /// Work with duplicate applicant records
    Duplicates {
        #[command(subcommand)]
        command: DuplicatesCommand,
    },
    /// Run the duplicate review walkthrough against sample records
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DuplicatesCommand {
    /// Print duplicate groups found in CSV exports
    Scan(ScanArgs),
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
        Command::Duplicates {
            command: DuplicatesCommand::Scan(args),
        } => run_scan(args),
        Command::Demo(args) => run_demo(args),
    }
}

use crate::demo::{run_demo, run_report, DemoArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use supervisi::error::AppError;
use supervisi::records::Nip;

#[derive(Parser, Debug)]
#[command(
    name = "Supervisi Dashboard",
    about = "Serve and inspect school supervision dashboards from the command line",
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
    /// Print one supervisor's school dashboard from a snapshot export
    Report(ReportArgs),
    /// Run an in-memory walkthrough of supervisions, workload evidence and scoring
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
    /// Seed the store from this snapshot instead of APP_SNAPSHOT_PATH
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Roster CSV applied on top of the snapshot
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Keep this viewer's dashboard live and log every recomputation
    #[arg(long, value_parser = crate::infra::parse_nip)]
    pub(crate) watch: Option<Nip>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Demo(args) => run_demo(args),
    }
}

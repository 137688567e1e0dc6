use crate::inspect::{run_seed_listing, run_tool_catalogue, SeedArgs, ToolsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mortgage_rules::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Rules Engine",
    about = "Run and inspect the mortgage lending business-rules evaluation engine",
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
    /// Print the published tool catalogue as JSON
    Tools(ToolsArgs),
    /// Print the seeded guideline rules as JSON
    Seed(SeedArgs),
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
        Command::Tools(args) => run_tool_catalogue(args),
        Command::Seed(args) => run_seed_listing(args),
    }
}

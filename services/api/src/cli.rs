use crate::commands::{run_batch, run_chat, run_predict, BatchArgs, ChatArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_eligibility::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Eligibility Assistant",
    about = "Serve, query and script the loan eligibility classifier from the command line",
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
    /// Score a single application passed as flags
    Predict(PredictArgs),
    /// Run the guided eligibility interview on stdin/stdout
    Chat(ChatArgs),
    /// Score every row of an applicant CSV export
    Batch(BatchArgs),
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
        Command::Predict(args) => run_predict(args),
        Command::Chat(args) => run_chat(args),
        Command::Batch(args) => run_batch(args),
    }
}

use clap::Parser;
use user_registry::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Validate(args) => cli::validate::run(args, cli.locale).await,
        Command::Seed(args) => cli::seed::run(args).await,
        Command::Count => cli::count::run().await,
    }
}

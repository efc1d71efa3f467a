use clap::Parser;
use qa_semantic_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Ask(args) => cli::ask::run(args).await,
        Command::Stats => cli::cache::stats().await,
        Command::Clear(args) => cli::cache::clear(args).await,
    }
}

use anyhow::Result;
use clap::Parser;
use launches::cli::{setup_tracing, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    cli.run().await
}

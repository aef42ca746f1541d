//! stagehand CLI — documentation build-pipeline stage.
//!
//! Discovers content roots in a source workspace, prepares each against a
//! content service under a build revision, and posts preview comments back
//! to pull requests.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

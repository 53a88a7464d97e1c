//! repairkb CLI — build and query a repair-guide knowledge base.
//!
//! Crawls a repair-guide site for savable pages, cleans and stores their
//! content, and ranks stored guides against repair questions.

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

//! SkillSync CLI — OSMT-to-Credential-Registry synchronization tool.
//!
//! Pulls an OSMT Open Skills catalog and republishes it as a CTDL
//! competency framework on the Credential Registry.

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

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::process::ExitCode;
use storefront::interfaces::cli::{args::Cli, run};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    storefront::logging::init(&cli.logging).into_diagnostic()?;

    run(cli).await.into_diagnostic()
}

//! Revenue Insights - Main Entry Point

use clap::Parser;
use revenue_insights::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so table and JSON output stay pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revenue_insights=info".into()),
        )
        .init();

    run(Cli::parse())
}

//! site-linkcheck CLI
//!
//! Verifies that every internal link and fragment in a built static site
//! resolves. Configured entirely by flags or environment variables.

use anyhow::Result;
use clap::Parser;
use site_linkcheck::check_links::{run_check_links, CheckLinksArgs};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-linkcheck")]
#[command(author = "RoyalBit Inc.")]
#[command(version)]
#[command(about = "Check internal links and fragments in a built static site")]
#[command(long_about = "Reads the sitemap from the build output, indexes every rendered page, and reports links to missing pages or missing anchors.\n\nExternal links are not checked.")]
struct Cli {
    #[command(flatten)]
    args: CheckLinksArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("site_linkcheck=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if run_check_links(cli.args).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

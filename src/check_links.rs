//! check-links: verify internal links of a built site
//!
//! Sitemap -> page index -> link resolution -> report. Broken links fail
//! the run; an inconsistent build aborts it.

use crate::config::{BaseUrl, CheckConfig};
use crate::error::CheckError;
use crate::page::{index_pages, PageIndex};
use crate::report::{
    annotate_results, write_report, AnnotationSink, GithubAnnotations, LinkReport, NoAnnotations,
    Summary,
};
use crate::resolve::resolve_links;
use crate::sitemap::read_sitemap;
use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct CheckLinksArgs {
    /// Site origin (and optional path prefix) that marks links as internal
    #[arg(long, env = "LINKCHECK_BASE_URL")]
    pub base_url: String,

    /// Root of the rendered site
    #[arg(long, env = "LINKCHECK_BUILD_DIR", default_value = "dist")]
    pub build_dir: PathBuf,

    /// Root of the authored page sources (used for annotation file hints)
    #[arg(long, env = "LINKCHECK_SOURCE_DIR", default_value = "src/content/docs")]
    pub source_dir: PathBuf,

    /// Sitemap file, relative to the build directory
    #[arg(long, env = "LINKCHECK_SITEMAP", default_value = "sitemap-0.xml")]
    pub sitemap: String,

    /// Rendered file name inside each page directory
    #[arg(long, env = "LINKCHECK_CONTENT_FILE", default_value = "index.html")]
    pub content_file: String,

    /// Extension of authored source files
    #[arg(long, env = "LINKCHECK_SOURCE_EXT", default_value = "mdx")]
    pub source_ext: String,

    /// Emit GitHub Actions annotations for broken links (not with --json)
    #[arg(long, env = "GITHUB_ACTIONS", value_parser = clap::builder::FalseyValueParser::new())]
    pub annotate: bool,

    /// Print the report as compact JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckLinksArgs {
    pub fn to_config(&self) -> Result<CheckConfig, CheckError> {
        let base = BaseUrl::parse(&self.base_url)?;
        Ok(CheckConfig {
            base,
            build_dir: self.build_dir.clone(),
            source_dir: self.source_dir.clone(),
            sitemap_file: self.sitemap.clone(),
            content_file: self.content_file.clone(),
            source_ext: self.source_ext.clone(),
            annotate: self.annotate,
        })
    }
}

/// Run the check and print the report. Returns whether every link is intact.
pub async fn run_check_links(args: CheckLinksArgs) -> Result<bool> {
    let config = args.to_config().context("Invalid configuration")?;

    let index = check_site(&config).await?;

    let results = resolve_links(&index, &config.base);
    let summary = Summary::from_results(&results, index.len());
    info!(
        broken = summary.total,
        pages = summary.pages_checked,
        "link check finished"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let report = LinkReport::new(&results, summary);
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else {
        write_report(&mut out, &results, &summary).context("Failed to write report")?;
    }
    out.flush()?;
    drop(out);

    // Workflow commands share stdout with the report, so JSON output stays clean
    let mut sink: Box<dyn AnnotationSink> = if config.annotate && !args.json {
        Box::new(GithubAnnotations::new(io::stdout()))
    } else {
        Box::new(NoAnnotations)
    };
    annotate_results(sink.as_mut(), &results);

    Ok(summary.passed())
}

/// Read the sitemap and index every page it lists
pub async fn check_site(config: &CheckConfig) -> Result<PageIndex> {
    let sitemap = config.sitemap_path();
    let pathnames = read_sitemap(&sitemap, &config.base)
        .await
        .context("Cannot determine the site's pages")?;
    info!(pages = pathnames.len(), sitemap = %sitemap.display(), "read sitemap");
    eprintln!(
        "Checking links on {} pages under {}...",
        pathnames.len(),
        config.base.as_str()
    );

    let index = index_pages(&pathnames, config)
        .await
        .context("Build output is inconsistent with the sitemap")?;
    Ok(index)
}

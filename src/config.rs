//! Run configuration
//!
//! One immutable value built from the CLI/env options and passed by
//! reference into every stage of the check.

use crate::error::CheckError;
use std::path::PathBuf;
use url::Url;

/// The site origin (plus optional path prefix) that marks a URL as internal.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    url: Url,
    /// Serialized form without a trailing slash, e.g. `https://example.com/docs`
    raw: String,
    /// Path prefix without a trailing slash; empty for a bare origin
    path: String,
}

impl BaseUrl {
    pub fn parse(input: &str) -> Result<Self, CheckError> {
        let invalid = |reason: &str| CheckError::InvalidBaseUrl {
            url: input.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(input.trim()).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        let raw = url.as_str().trim_end_matches('/').to_string();
        let path = url.path().trim_end_matches('/').to_string();
        Ok(Self { url, raw, path })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path prefix every internal URL must start with (no trailing slash).
    pub fn path_prefix(&self) -> &str {
        &self.path
    }

    /// Absolute URL of a page: base URL followed by the pathname.
    pub fn page_href(&self, pathname: &str) -> Url {
        let mut href = self.url.clone();
        href.set_path(&format!("{}{}", self.path, pathname));
        href
    }
}

/// Configuration for a check run
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub base: BaseUrl,
    /// Root of the rendered site
    pub build_dir: PathBuf,
    /// Root of the authored sources, used only for attribution hints
    pub source_dir: PathBuf,
    /// Sitemap file name relative to `build_dir`
    pub sitemap_file: String,
    /// Rendered file name inside each pathname directory
    pub content_file: String,
    /// Extension of authored source files (without the dot)
    pub source_ext: String,
    /// Forward broken links to the CI annotation sink
    pub annotate: bool,
}

impl CheckConfig {
    pub fn new(base: BaseUrl, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            base,
            build_dir: build_dir.into(),
            source_dir: PathBuf::from("src/content/docs"),
            sitemap_file: "sitemap-0.xml".to_string(),
            content_file: "index.html".to_string(),
            source_ext: "mdx".to_string(),
            annotate: false,
        }
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.build_dir.join(&self.sitemap_file)
    }

    /// Location of the rendered artifact for a pathname.
    pub fn content_path(&self, pathname: &str) -> PathBuf {
        self.build_dir
            .join(pathname.trim_start_matches('/'))
            .join(&self.content_file)
    }

    /// Candidate source files for a pathname, most specific first.
    pub fn source_candidates(&self, pathname: &str) -> Vec<PathBuf> {
        let trimmed = pathname.trim_matches('/');
        let mut candidates = Vec::with_capacity(2);
        if !trimmed.is_empty() {
            candidates.push(
                self.source_dir
                    .join(format!("{}.{}", trimmed, self.source_ext)),
            );
        }
        candidates.push(
            self.source_dir
                .join(trimmed)
                .join(format!("index.{}", self.source_ext)),
        );
        candidates
    }
}

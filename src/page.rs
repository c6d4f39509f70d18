//! Page indexer
//!
//! Loads the rendered artifact for each sitemap pathname and keeps only
//! what link resolution needs: outbound link targets and addressable
//! anchors.

use crate::config::CheckConfig;
use crate::error::CheckError;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// A rendered page of the site
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Site-relative path, always ending in `/`
    pub pathname: String,
    /// Absolute URL (base URL + pathname)
    pub href: Url,
    /// Best-effort authored source, for diagnostics only
    pub attribution: Option<PathBuf>,
    /// Unique `href` values as authored, in document order
    pub link_targets: Vec<String>,
    /// Addressable fragments, each prefixed with `#`
    pub anchor_targets: HashSet<String>,
}

/// Pages keyed by pathname, in sitemap order
#[derive(Debug, Default)]
pub struct PageIndex {
    pages: Vec<Page>,
    positions: HashMap<String, usize>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. A pathname already present keeps its first entry.
    pub fn insert(&mut self, page: Page) -> bool {
        if self.positions.contains_key(&page.pathname) {
            return false;
        }
        self.positions.insert(page.pathname.clone(), self.pages.len());
        self.pages.push(page);
        true
    }

    pub fn get(&self, pathname: &str) -> Option<&Page> {
        self.positions.get(pathname).map(|&i| &self.pages[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromIterator<Page> for PageIndex {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        let mut index = Self::new();
        for page in iter {
            index.insert(page);
        }
        index
    }
}

/// Links and anchors extracted from one rendered document
#[derive(Debug, Default, PartialEq)]
pub struct ParsedPage {
    pub link_targets: Vec<String>,
    pub anchor_targets: HashSet<String>,
}

/// Load every page in order. The first missing artifact aborts the run.
pub async fn index_pages(
    pathnames: &[String],
    config: &CheckConfig,
) -> Result<PageIndex, CheckError> {
    let mut index = PageIndex::new();
    for pathname in pathnames {
        let page = load_page(pathname, config).await?;
        index.insert(page);
    }
    Ok(index)
}

/// Build the `Page` record for one pathname
pub async fn load_page(pathname: &str, config: &CheckConfig) -> Result<Page, CheckError> {
    let content_path = config.content_path(pathname);

    let bytes = match tokio::fs::read(&content_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CheckError::MissingArtifact {
                pathname: pathname.to_string(),
                path: content_path,
            });
        }
        Err(source) => {
            return Err(CheckError::PageRead {
                path: content_path,
                source,
            });
        }
    };

    // Stray invalid bytes in rendered output must not hide the page's links
    let html = String::from_utf8_lossy(&bytes);
    let ParsedPage {
        link_targets,
        anchor_targets,
    } = parse_page(&html);
    let attribution = attribution_hint(pathname, config).await;

    Ok(Page {
        pathname: pathname.to_string(),
        href: config.base.page_href(pathname),
        attribution,
        link_targets,
        anchor_targets,
    })
}

/// Extract link targets and anchor targets from rendered markup
pub fn parse_page(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let mut seen = HashSet::new();
    let link_targets = select_attrs(&doc, "a[href]", "href")
        .into_iter()
        .filter(|href| seen.insert(href.clone()))
        .collect();

    let anchor_targets = select_attrs(&doc, "a[name]", "name")
        .into_iter()
        .chain(select_attrs(&doc, "[id]", "id"))
        .map(|target| format!("#{}", target))
        .collect();

    ParsedPage {
        link_targets,
        anchor_targets,
    }
}

fn select_attrs(doc: &Html, sel: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(sel) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(String::from)
        .collect()
}

/// Find the authored source for a pathname, if any.
///
/// Never fails: a page without a source simply has no hint.
pub async fn attribution_hint(pathname: &str, config: &CheckConfig) -> Option<PathBuf> {
    for candidate in config.source_candidates(pathname) {
        let is_file = tokio::fs::metadata(&candidate)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            debug!(pathname, source = %candidate.display(), "mapped page to source");
            return Some(candidate);
        }
    }
    debug!(pathname, "no source file found for page");
    None
}

//! Sitemap reader: the authoritative set of page pathnames
//!
//! Collects every `<loc>` URL that lives under the base URL and turns it
//! into a site pathname. Order of first appearance is kept; duplicates
//! collapse.

use crate::config::BaseUrl;
use crate::error::CheckError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Read and parse the sitemap at `path`.
///
/// An unreadable or malformed sitemap is fatal: without it the page set
/// is unknown.
pub async fn read_sitemap(path: &Path, base: &BaseUrl) -> Result<Vec<String>, CheckError> {
    let xml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CheckError::SitemapRead {
            path: path.to_path_buf(),
            source,
        })?;

    parse_sitemap(&xml, base).map_err(|e| CheckError::SitemapParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Extract unique page pathnames from sitemap XML
pub fn parse_sitemap(xml: &str, base: &BaseUrl) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_loc = false;
    let mut loc = String::new();
    let mut seen = HashSet::new();
    let mut pathnames = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                loc.clear();
            }
            Event::Text(e) if in_loc => loc.push_str(&e.unescape()?),
            Event::CData(e) if in_loc => loc.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let Some(pathname) = loc_pathname(loc.trim(), base) else {
                    continue;
                };
                if seen.insert(pathname.clone()) {
                    pathnames.push(pathname);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pathnames)
}

fn loc_pathname(loc: &str, base: &BaseUrl) -> Option<String> {
    match Url::parse(loc) {
        Ok(url) => {
            let pathname = site_pathname(&url, base);
            if pathname.is_none() {
                debug!(loc, "sitemap entry outside base URL");
            }
            pathname
        }
        Err(e) => {
            debug!(loc, error = %e, "skipping unparseable sitemap entry");
            None
        }
    }
}

/// Site pathname of `url` if it lives under the base URL.
///
/// The result always starts and ends with `/`. This is the one
/// normalization used both for sitemap entries and for resolved links.
pub fn site_pathname(url: &Url, base: &BaseUrl) -> Option<String> {
    if url.origin() != base.url().origin() {
        return None;
    }

    let rest = url.path().strip_prefix(base.path_prefix())?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let mut pathname = if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    };
    if !pathname.ends_with('/') {
        pathname.push('/');
    }
    Some(pathname)
}

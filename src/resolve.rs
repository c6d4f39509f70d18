//! Link resolver
//!
//! Resolves every outbound link of every indexed page and classifies the
//! broken ones. Pages are visited in index order and links in document
//! order, so the output is deterministic for a given index.

use crate::config::BaseUrl;
use crate::page::{Page, PageIndex};
use crate::sitemap::site_pathname;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::warn;
use url::Url;

/// Why a link is broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokenKind {
    /// No page exists at the resolved pathname
    MissingPage,
    /// The page exists but has no anchor or id matching the fragment
    MissingFragment,
}

/// A broken link found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCheckResult<'a> {
    pub page: &'a Page,
    /// Absolute URL the link resolved to
    pub href: Url,
    pub kind: BrokenKind,
}

impl LinkCheckResult<'_> {
    pub fn is_missing_page(&self) -> bool {
        self.kind == BrokenKind::MissingPage
    }

    pub fn is_missing_fragment(&self) -> bool {
        self.kind == BrokenKind::MissingFragment
    }
}

/// Resolve all links in the index and return the broken ones
pub fn resolve_links<'a>(index: &'a PageIndex, base: &BaseUrl) -> Vec<LinkCheckResult<'a>> {
    let mut results = Vec::new();

    for page in index.iter() {
        for link in &page.link_targets {
            if let Some(result) = check_link(index, base, page, link) {
                results.push(result);
            }
        }
    }

    results
}

fn check_link<'a>(
    index: &PageIndex,
    base: &BaseUrl,
    page: &'a Page,
    link: &str,
) -> Option<LinkCheckResult<'a>> {
    let href = match page.href.join(link) {
        Ok(href) => href,
        Err(e) => {
            warn!(page = %page.pathname, link, error = %e, "skipping unresolvable link");
            return None;
        }
    };

    // External links are out of scope
    let pathname = site_pathname(&href, base)?;

    let kind = match index.get(&pathname) {
        None => BrokenKind::MissingPage,
        Some(target) => {
            let fragment = href.fragment().filter(|f| !f.is_empty())?;
            let anchor = format!("#{}", percent_decode_str(fragment).decode_utf8_lossy());
            if target.anchor_targets.contains(&anchor) {
                return None;
            }
            BrokenKind::MissingFragment
        }
    };

    Some(LinkCheckResult { page, href, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn base() -> BaseUrl {
        BaseUrl::parse("https://example.com").unwrap()
    }

    fn page(pathname: &str, links: &[&str], anchors: &[&str]) -> Page {
        Page {
            pathname: pathname.to_string(),
            href: base().page_href(pathname),
            attribution: None,
            link_targets: links.iter().map(|s| s.to_string()).collect(),
            anchor_targets: anchors.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        }
    }

    fn kinds(results: &[LinkCheckResult<'_>]) -> Vec<(String, BrokenKind)> {
        results
            .iter()
            .map(|r| (r.href.to_string(), r.kind))
            .collect()
    }

    #[test]
    fn test_valid_fragment_link() {
        let index: PageIndex = vec![
            page("/a/", &["/b/#intro"], &[]),
            page("/b/", &[], &["#intro"]),
        ]
        .into_iter()
        .collect();

        assert!(resolve_links(&index, &base()).is_empty());
    }

    #[test]
    fn test_missing_page() {
        let index: PageIndex = vec![page("/a/", &["/c/", "/c/#intro"], &[])]
            .into_iter()
            .collect();

        let results = resolve_links(&index, &base());
        assert_eq!(
            kinds(&results),
            vec![
                ("https://example.com/c/".to_string(), BrokenKind::MissingPage),
                ("https://example.com/c/#intro".to_string(), BrokenKind::MissingPage),
            ]
        );
        assert!(results.iter().all(|r| r.is_missing_page() && !r.is_missing_fragment()));
        assert_eq!(results[0].page.pathname, "/a/");
    }

    #[test]
    fn test_missing_fragment_on_self() {
        let index: PageIndex = vec![page("/a/", &["#missing", "/a/#top"], &["#top"])]
            .into_iter()
            .collect();

        let results = resolve_links(&index, &base());
        assert_eq!(
            kinds(&results),
            vec![(
                "https://example.com/a/#missing".to_string(),
                BrokenKind::MissingFragment
            )]
        );
        assert!(results[0].is_missing_fragment());
    }

    #[test]
    fn test_fragment_match_is_case_sensitive() {
        let index: PageIndex = vec![
            page("/a/", &["/b/#Intro", "/b/#intro"], &[]),
            page("/b/", &[], &["#intro"]),
        ]
        .into_iter()
        .collect();

        let results = resolve_links(&index, &base());
        assert_eq!(
            kinds(&results),
            vec![(
                "https://example.com/b/#Intro".to_string(),
                BrokenKind::MissingFragment
            )]
        );
    }

    #[test]
    fn test_empty_fragment_and_relative_links() {
        let index: PageIndex = vec![
            page("/guide/intro/", &["#", "../setup/", "../setup", "?tab=1", "./"], &[]),
            page("/guide/setup/", &[], &[]),
        ]
        .into_iter()
        .collect();

        assert!(resolve_links(&index, &base()).is_empty());
    }

    #[test]
    fn test_percent_encoded_fragment() {
        let index: PageIndex = vec![page(
            "/a/",
            &["#caf%C3%A9", "#with space"],
            &["#café", "#with space"],
        )]
        .into_iter()
        .collect();

        assert!(resolve_links(&index, &base()).is_empty());
    }

    #[test]
    fn test_external_links_ignored() {
        let index: PageIndex = vec![page(
            "/a/",
            &[
                "https://other.com/missing/",
                "//cdn.example.org/x#nope",
                "http://example.com/c/",
                "mailto:team@example.com",
                "javascript:void(0)",
            ],
            &[],
        )]
        .into_iter()
        .collect();

        assert!(resolve_links(&index, &base()).is_empty());
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let index: PageIndex = vec![
            page("/a/", &["/b", "https://EXAMPLE.com/b#x"], &[]),
            page("/b/", &[], &["#x"]),
        ]
        .into_iter()
        .collect();

        assert!(resolve_links(&index, &base()).is_empty());
    }

    #[test]
    fn test_results_follow_index_order() {
        let index: PageIndex = vec![
            page("/z/", &["/missing-1/", "#gone"], &[]),
            page("/a/", &["/missing-2/"], &[]),
        ]
        .into_iter()
        .collect();

        let results = resolve_links(&index, &base());
        let pages: Vec<&str> = results.iter().map(|r| r.page.pathname.as_str()).collect();
        assert_eq!(pages, vec!["/z/", "/z/", "/a/"]);

        assert_eq!(results, resolve_links(&index, &base()));
    }
}

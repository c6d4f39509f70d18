//! site-linkcheck: internal link verification for built static sites
//!
//! Pipeline:
//! - sitemap: authoritative page set
//! - page: rendered page index (links and anchors)
//! - resolve: broken link classification
//! - report: text/JSON report and CI annotations

pub mod check_links;
pub mod config;
pub mod error;
pub mod page;
pub mod report;
pub mod resolve;
pub mod sitemap;

pub use check_links::{check_site, run_check_links, CheckLinksArgs};
pub use config::{BaseUrl, CheckConfig};
pub use error::CheckError;
pub use page::{Page, PageIndex};
pub use report::{AnnotationSink, Summary};
pub use resolve::{resolve_links, BrokenKind, LinkCheckResult};

//! Fatal errors that abort a check run.
//!
//! Broken links are not errors: they are collected and reported.
//! Everything here means the build output is inconsistent or the
//! configuration is wrong, so no partial report is produced.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to read sitemap {}", path.display())]
    SitemapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sitemap {}: {message}", path.display())]
    SitemapParse { path: PathBuf, message: String },

    #[error("no rendered page for {pathname} (expected {})", path.display())]
    MissingArtifact { pathname: String, path: PathBuf },

    #[error("failed to read rendered page {}", path.display())]
    PageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_message() {
        let err = CheckError::MissingArtifact {
            pathname: "/guide/".to_string(),
            path: PathBuf::from("dist/guide/index.html"),
        };
        assert_eq!(
            err.to_string(),
            "no rendered page for /guide/ (expected dist/guide/index.html)"
        );
    }
}

//! Reporter: text/JSON output, summary counts and CI annotations

use crate::resolve::{BrokenKind, LinkCheckResult};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

/// Summary counts for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub pages_checked: usize,
    pub total: usize,
    pub missing_pages: usize,
    pub missing_fragments: usize,
}

impl Summary {
    pub fn from_results(results: &[LinkCheckResult<'_>], pages_checked: usize) -> Self {
        let total = results.len();
        let missing_fragments = results.iter().filter(|r| r.is_missing_fragment()).count();
        Self {
            pages_checked,
            total,
            missing_pages: total - missing_fragments,
            missing_fragments,
        }
    }

    pub fn passed(&self) -> bool {
        self.total == 0
    }
}

/// Write the human-readable report.
///
/// Results are grouped by page in the order given; a page header is
/// printed each time the source page changes.
pub fn write_report<W: Write>(
    out: &mut W,
    results: &[LinkCheckResult<'_>],
    summary: &Summary,
) -> io::Result<()> {
    let mut current: Option<&str> = None;

    for result in results {
        let pathname = result.page.pathname.as_str();
        if current != Some(pathname) {
            if current.is_some() {
                writeln!(out)?;
            }
            writeln!(out, "{}", pathname)?;
            current = Some(pathname);
        }

        let marker = match result.kind {
            BrokenKind::MissingPage => "✗ missing page    ",
            BrokenKind::MissingFragment => "# missing fragment",
        };
        writeln!(out, "  {}  {}", marker, result.href)?;
    }

    if summary.passed() {
        writeln!(
            out,
            "All internal links are valid ({} checked)",
            plural(summary.pages_checked, "page")
        )?;
    } else {
        writeln!(out)?;
        writeln!(
            out,
            "{} ({}, {})",
            plural(summary.total, "broken link"),
            plural(summary.missing_pages, "broken page link"),
            plural(summary.missing_fragments, "broken fragment link"),
        )?;
    }

    Ok(())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Machine-readable report (compact JSON)
#[derive(Debug, Serialize)]
pub struct LinkReport {
    pub ok: bool,
    #[serde(flatten)]
    pub summary: Summary,
    pub results: Vec<BrokenLink>,
}

/// One broken link in the JSON report
#[derive(Debug, Serialize)]
pub struct BrokenLink {
    pub page: String,
    pub href: String,
    pub kind: BrokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LinkReport {
    pub fn new(results: &[LinkCheckResult<'_>], summary: Summary) -> Self {
        Self {
            ok: summary.passed(),
            summary,
            results: results
                .iter()
                .map(|r| BrokenLink {
                    page: r.page.pathname.clone(),
                    href: r.href.to_string(),
                    kind: r.kind,
                    source: r.page.attribution.as_ref().map(|p| p.display().to_string()),
                })
                .collect(),
        }
    }
}

/// A diagnostic forwarded to a CI annotation sink
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<'a> {
    pub title: String,
    pub message: String,
    pub file: Option<&'a Path>,
}

impl<'a> Annotation<'a> {
    pub fn for_result(result: &LinkCheckResult<'a>) -> Self {
        let title = match result.kind {
            BrokenKind::MissingPage => format!("Broken link on {}", result.page.pathname),
            BrokenKind::MissingFragment => {
                format!("Broken fragment link on {}", result.page.pathname)
            }
        };
        Self {
            title,
            message: result.href.to_string(),
            file: result.page.attribution.as_deref(),
        }
    }
}

/// Receives one annotation per broken link
pub trait AnnotationSink {
    fn annotate(&mut self, annotation: &Annotation<'_>) -> io::Result<()>;
}

/// Disabled sink
pub struct NoAnnotations;

impl AnnotationSink for NoAnnotations {
    fn annotate(&mut self, _annotation: &Annotation<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// GitHub Actions workflow commands (`::error ...::message`)
pub struct GithubAnnotations<W: Write> {
    out: W,
}

impl<W: Write> GithubAnnotations<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AnnotationSink for GithubAnnotations<W> {
    fn annotate(&mut self, annotation: &Annotation<'_>) -> io::Result<()> {
        let mut properties = Vec::with_capacity(2);
        if let Some(file) = annotation.file {
            properties.push(format!(
                "file={}",
                escape_property(&file.display().to_string())
            ));
        }
        properties.push(format!("title={}", escape_property(&annotation.title)));

        writeln!(
            self.out,
            "::error {}::{}",
            properties.join(","),
            escape_data(&annotation.message)
        )
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// Forward every result to the sink. Sink failures are logged and ignored.
pub fn annotate_results(sink: &mut dyn AnnotationSink, results: &[LinkCheckResult<'_>]) {
    for result in results {
        if let Err(e) = sink.annotate(&Annotation::for_result(result)) {
            warn!(page = %result.page.pathname, error = %e, "failed to emit annotation");
        }
    }
}

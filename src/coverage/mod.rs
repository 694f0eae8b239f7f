// Coverage module - Load BullseyeCoverage reports and find never-executed functions
//
// A Bullseye XML report is a tree:
// BullseyeCoverage -> folder* -> src -> fn
// Each fn carries fn_cov (function coverage) and cd_cov (condition/decision coverage).

mod bullseye;
mod filter;

pub use bullseye::{BullseyeParser, BULLSEYE_NAMESPACE};
pub use filter::{FilterOutcome, FilterStats, ZeroCoverageFilter, MAX_DEPTH};

use crate::exclusion::ExclusionSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Value of an absent coverage attribute, and the only value counted as "never executed"
pub const UNCOVERED: &str = "0";

/// Errors raised while loading or walking a coverage report
#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Failed to read coverage report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    #[error("Unexpected root element `{found}`, expected BullseyeCoverage")]
    UnexpectedRoot { found: String },
    #[error("Unexpected element `{0}` after the root element")]
    TrailingElement(String),
    #[error("Unexpected text `{0}` outside the root element")]
    StrayText(String),
    #[error("Undeclared namespace prefix `{0}`")]
    UnboundPrefix(String),
    #[error("Coverage report ended before {0}")]
    Truncated(&'static str),
    #[error("Traversal failed at `{path}`: {reason}")]
    Traversal { path: String, reason: String },
}

/// A parsed BullseyeCoverage report
///
/// The root element contributes no path segment, so only its children are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageDocument {
    pub children: Vec<CoverageNode>,
}

impl CoverageDocument {
    pub fn new(children: Vec<CoverageNode>) -> Self {
        Self { children }
    }

    /// Parse a report held in memory
    pub fn parse_str(content: &str) -> Result<Self, CoverageError> {
        bullseye::parse_document(content)
    }
}

/// A node of the report tree below the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageNode {
    /// `<folder>`
    Folder(Container),
    /// `<src>`
    Source(Container),
    /// `<fn>`
    Function(FunctionEntry),
}

/// Folder or source-file node: a named path segment with ordered children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub children: Vec<CoverageNode>,
}

impl Container {
    pub fn new(name: impl Into<String>, children: Vec<CoverageNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// A function entry with its raw coverage attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: String,
    /// Raw `fn_cov` attribute, `None` when absent
    pub fn_cov: Option<String>,
    /// Raw `cd_cov` attribute, `None` when absent
    pub cd_cov: Option<String>,
}

impl FunctionEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_coverage(mut self, fn_cov: &str, cd_cov: &str) -> Self {
        self.fn_cov = Some(fn_cov.to_string());
        self.cd_cov = Some(cd_cov.to_string());
        self
    }

    pub fn fn_cov(&self) -> &str {
        self.fn_cov.as_deref().unwrap_or(UNCOVERED)
    }

    pub fn cd_cov(&self) -> &str {
        self.cd_cov.as_deref().unwrap_or(UNCOVERED)
    }

    /// Both metrics are literally "0". "0.0" or " 0" do not count.
    pub fn is_uncovered(&self) -> bool {
        self.fn_cov() == UNCOVERED && self.cd_cov() == UNCOVERED
    }
}

/// Trait for coverage report loaders
pub trait CoverageParser {
    /// Load a whole report into memory
    fn parse(&self, path: &Path) -> Result<CoverageDocument, CoverageError>;

    /// Check if this parser can handle the given file
    fn can_parse(&self, path: &Path) -> bool;
}

/// Load a report and list its zero-coverage functions, propagating any error
pub fn try_find_zero_coverage(
    report: &Path,
    exclusions: &ExclusionSet,
) -> Result<FilterOutcome, CoverageError> {
    let parser = BullseyeParser::new();
    if !parser.can_parse(report) {
        warn!(
            "{} does not look like a BullseyeCoverage report",
            report.display()
        );
    }

    let document = parser.parse(report)?;
    debug!(
        "Loaded {} top-level node(s) from {}",
        document.children.len(),
        report.display()
    );

    ZeroCoverageFilter::new(exclusions).apply(&document)
}

/// Load a report and list its zero-coverage functions
///
/// Errors are logged and turned into an empty outcome. A partial list could be
/// mistaken for a clean report, so nothing found before the failure is kept.
pub fn find_zero_coverage(report: &Path, exclusions: &ExclusionSet) -> FilterOutcome {
    match try_find_zero_coverage(report, exclusions) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Error while parsing coverage report: {}", e);
            FilterOutcome::default()
        }
    }
}

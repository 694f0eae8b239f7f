// Zero-coverage filter - depth-first walk over a parsed report
//
// Folders and source files extend the path unless their name is excluded,
// in which case the whole subtree is skipped. Functions are leaves and are
// emitted when both fn_cov and cd_cov are the literal string "0".

use super::{Container, CoverageDocument, CoverageError, CoverageNode};
use crate::exclusion::ExclusionSet;
use tracing::debug;

/// Deepest folder/source nesting the walk accepts
pub const MAX_DEPTH: usize = 512;

/// Counters collected during a walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Function nodes reached (pruned subtrees not included)
    pub functions_seen: usize,
    /// Function nodes emitted
    pub functions_uncovered: usize,
    /// Folder/source nodes skipped because their name is excluded
    pub pruned_subtrees: usize,
}

/// Result of a walk: paths in discovery order plus counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub paths: Vec<String>,
    pub stats: FilterStats,
}

/// One link of the accumulated path, borrowed from the caller's stack frame
struct Segment<'a> {
    name: &'a str,
    parent: Option<&'a Segment<'a>>,
}

/// Walks a report and collects functions with zero function and condition coverage
pub struct ZeroCoverageFilter<'a> {
    exclusions: &'a ExclusionSet,
}

impl<'a> ZeroCoverageFilter<'a> {
    pub fn new(exclusions: &'a ExclusionSet) -> Self {
        Self { exclusions }
    }

    /// Walk the whole document
    ///
    /// On error nothing collected so far is returned.
    pub fn apply(&self, document: &CoverageDocument) -> Result<FilterOutcome, CoverageError> {
        let mut outcome = FilterOutcome::default();

        for child in &document.children {
            self.visit(child, None, 0, &mut outcome)?;
        }

        debug!(
            "Visited {} function(s), {} uncovered, {} subtree(s) pruned",
            outcome.stats.functions_seen,
            outcome.stats.functions_uncovered,
            outcome.stats.pruned_subtrees
        );

        Ok(outcome)
    }

    fn visit(
        &self,
        node: &CoverageNode,
        path: Option<&Segment<'_>>,
        depth: usize,
        outcome: &mut FilterOutcome,
    ) -> Result<(), CoverageError> {
        match node {
            CoverageNode::Function(entry) => {
                outcome.stats.functions_seen += 1;
                if entry.is_uncovered() {
                    outcome.stats.functions_uncovered += 1;
                    outcome.paths.push(render(path, &entry.name));
                }
                Ok(())
            }
            CoverageNode::Folder(container) | CoverageNode::Source(container) => {
                self.descend(container, path, depth, outcome)
            }
        }
    }

    fn descend(
        &self,
        container: &Container,
        path: Option<&Segment<'_>>,
        depth: usize,
        outcome: &mut FilterOutcome,
    ) -> Result<(), CoverageError> {
        if self.exclusions.contains(&container.name) {
            debug!("Pruning {}", render(path, &container.name));
            outcome.stats.pruned_subtrees += 1;
            return Ok(());
        }

        if depth >= MAX_DEPTH {
            return Err(CoverageError::Traversal {
                path: render(path, &container.name),
                reason: format!("nesting deeper than {} levels", MAX_DEPTH),
            });
        }

        if container.name.is_empty() {
            debug!("Unnamed node below `{}`", render(path, ""));
        }

        let segment = Segment {
            name: &container.name,
            parent: path,
        };

        for child in &container.children {
            self.visit(child, Some(&segment), depth + 1, outcome)?;
        }

        Ok(())
    }
}

/// Join `segment` onto `path`, without a separator when `path` is still empty
pub fn join_segment(mut path: String, segment: &str) -> String {
    if !path.is_empty() {
        path.push('/');
    }
    path.push_str(segment);
    path
}

fn render(path: Option<&Segment<'_>>, leaf: &str) -> String {
    let mut names = vec![leaf];
    let mut cursor = path;
    while let Some(segment) = cursor {
        names.push(segment.name);
        cursor = segment.parent;
    }

    names
        .into_iter()
        .rev()
        .fold(String::new(), |acc, name| join_segment(acc, name))
}

//! zerocov - List never-executed functions in BullseyeCoverage reports
//!
//! This library finds the functions of a Bullseye XML coverage report whose
//! function coverage and condition/decision coverage are both zero, leaving
//! out any folder or source file named in an exclusion list.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **Exclusion loading** - Read the names of subtrees to prune
//! 2. **Report loading** - Parse the XML report into a typed tree
//! 3. **Filtering** - Walk the tree depth-first and collect `folder/file/function` paths
//! 4. **Reporting** - Write the paths as a JSON array

pub mod config;
pub mod coverage;
pub mod exclusion;
pub mod report;

pub use config::Config;
pub use coverage::{
    find_zero_coverage, try_find_zero_coverage, BullseyeParser, CoverageDocument, CoverageError,
    CoverageNode, CoverageParser, FilterOutcome, FilterStats, ZeroCoverageFilter,
};
pub use exclusion::ExclusionSet;
pub use report::JsonReporter;

//! Exclusion list support
//!
//! An exclusion list names folders (or source files) whose whole subtree is
//! left out of the report. The file holds one bare name per line; names are
//! matched exactly, never as paths or patterns.

use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Set of names to prune, fixed for the lifetime of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    /// Load an exclusion list file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read exclusion list: {}", path.display()))?;

        Ok(Self::from_lines(&content))
    }

    /// Build a set from newline-delimited names. Lines are trimmed and blanks dropped.
    pub fn from_lines(content: &str) -> Self {
        let mut set = Self::default();
        set.extend(content.lines());
        set
    }

    /// Add more names, with the same trimming rules as the file
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                self.names.insert(name.to_string());
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

// src/engine/filters.rs

//! User-supplied program filters.
//!
//! Each filter is a glob matched against program names. An empty filter
//! list selects every program. Filters remember whether they matched
//! anything so the CLI can report the ones that did not.

use globset::{Glob, GlobMatcher};

use crate::errors::{Result, TestexecError};

#[derive(Debug, Clone)]
struct Filter {
    pattern: String,
    matcher: GlobMatcher,
    used: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| {
                TestexecError::ConfigError(format!("invalid filter '{pattern}': {e}"))
            })?;
            filters.push(Filter {
                pattern: pattern.to_string(),
                matcher: glob.compile_matcher(),
                used: false,
            });
        }
        Ok(Self { filters })
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Does `name` pass the filters? Marks every filter that matched.
    pub fn matches(&mut self, name: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let mut matched = false;
        for filter in self.filters.iter_mut() {
            if filter.matcher.is_match(name) {
                filter.used = true;
                matched = true;
            }
        }
        matched
    }

    /// Patterns that have not matched any name so far, in input order.
    pub fn unused(&self) -> Vec<&str> {
        self.filters
            .iter()
            .filter(|f| !f.used)
            .map(|f| f.pattern.as_str())
            .collect()
    }
}

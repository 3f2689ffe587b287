//! Translation of list parameters into a page window and query predicates.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 100;
pub const DEFAULT_OFFSET: i64 = 0;
pub const MAX_LIMIT: i64 = 200;

/// The result window of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationData {
    pub limit: i64,
    pub offset: i64,
}

impl PaginationData {
    /// Build a window from optional caller values.
    ///
    /// Limits above [`MAX_LIMIT`] are clamped, not rejected. Non-positive
    /// limits fall back to [`DEFAULT_LIMIT`] and negative offsets to zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > MAX_LIMIT => MAX_LIMIT,
            Some(l) if l > 0 => l,
            _ => DEFAULT_LIMIT,
        };
        let offset = offset.filter(|o| *o >= 0).unwrap_or(DEFAULT_OFFSET);
        Self { limit, offset }
    }
}

impl Default for PaginationData {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// Caller-supplied list filters. Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterData {
    /// Substring matched against name or URL.
    pub search: String,
    /// Comma-separated architecture allow-list.
    pub arch: String,
    /// Comma-separated version allow-list.
    pub version: String,
    /// Exact architecture, or configurations that accept any architecture.
    pub available_for_arch: String,
    /// Exact version, or configurations that accept any version.
    pub available_for_version: String,
}

/// A single constraint on the configurations of one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `arch` equals the value or is unset.
    AvailableForArch(String),
    /// `versions` contains the value or is empty.
    AvailableForVersion(String),
    /// Name or URL contains the value.
    Search(String),
    /// `arch` is one of the values.
    ArchIn(Vec<String>),
    /// `versions` contains at least one of the values.
    VersionIn(Vec<String>),
}

impl FilterData {
    /// Predicates to apply, in evaluation order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if !self.available_for_arch.is_empty() {
            predicates.push(Predicate::AvailableForArch(
                self.available_for_arch.clone(),
            ));
        }
        if !self.available_for_version.is_empty() {
            predicates.push(Predicate::AvailableForVersion(
                self.available_for_version.clone(),
            ));
        }
        if !self.search.is_empty() {
            predicates.push(Predicate::Search(self.search.clone()));
        }
        if !self.arch.is_empty() {
            predicates.push(Predicate::ArchIn(split_list(&self.arch)));
        }
        if !self.version.is_empty() {
            predicates.push(Predicate::VersionIn(split_list(&self.version)));
        }

        predicates
    }

    /// Non-empty filters as query parameter pairs.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("search", self.search.as_str()),
            ("arch", self.arch.as_str()),
            ("version", self.version.as_str()),
            ("available_for_arch", self.available_for_arch.as_str()),
            ("available_for_version", self.available_for_version.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

// Values are neither trimmed nor deduplicated.
fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

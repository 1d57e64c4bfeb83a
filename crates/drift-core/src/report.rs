//! Verification results

use std::collections::{BTreeMap, BTreeSet};

use drift_content::DiffRecord;
use serde::Serialize;

/// An object that could not be compared
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedObject {
    pub name: String,
    pub reason: String,
}

/// Verification output of one category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub category: String,
    /// Objects with no observed copy
    pub desired_only: BTreeSet<String>,
    /// Observed objects with no desired source
    pub observed_only: BTreeSet<String>,
    /// Differences per object present on both sides
    pub value_diffs: BTreeMap<String, Vec<DiffRecord>>,
    /// Objects whose owner, group or mode differ
    pub permission_violations: Vec<String>,
    /// Not counted as differences
    pub skipped: Vec<SkippedObject>,
}

impl ReconciliationResult {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn difference_count(&self) -> usize {
        self.desired_only.len()
            + self.observed_only.len()
            + self.value_diffs.values().map(Vec::len).sum::<usize>()
            + self.permission_violations.len()
    }

    pub fn is_clean(&self) -> bool {
        self.difference_count() == 0
    }

    /// Record differences for an object; empty lists are dropped
    pub fn add_diffs(&mut self, name: &str, records: Vec<DiffRecord>) {
        if !records.is_empty() {
            self.value_diffs.insert(name.to_string(), records);
        }
    }

    pub fn skip(&mut self, name: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedObject {
            name: name.to_string(),
            reason: reason.into(),
        });
    }
}

/// All category results of one verification of a target
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub target: String,
    pub results: Vec<ReconciliationResult>,
}

impl RunReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            results: Vec::new(),
        }
    }

    pub fn total_differences(&self) -> usize {
        self.results.iter().map(ReconciliationResult::difference_count).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total_differences() == 0
    }

    pub fn result(&self, category: &str) -> Option<&ReconciliationResult> {
        self.results.iter().find(|r| r.category == category)
    }
}

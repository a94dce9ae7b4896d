// crates/analyzer/src/history.rs
use crate::AnalysisResult;
use common::{Error, Result};
use std::collections::VecDeque;

/// Bounded, most-recent-first list of past analyses.
///
/// Owned by whoever drives the analyzer; the analyzer itself keeps nothing
/// between calls.
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    entries: VecDeque<AnalysisResult>,
    capacity: usize,
}

impl AnalysisHistory {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("history capacity must be at least 1".to_string()));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Insert as the newest entry, returning the evicted oldest one when full
    pub fn push(&mut self, result: AnalysisResult) -> Option<AnalysisResult> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(result);
        evicted
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.entries.front()
    }

    /// Newest analysis of the given symbol (case-insensitive)
    pub fn latest_for(&self, symbol: &str) -> Option<&AnalysisResult> {
        self.entries
            .iter()
            .find(|r| r.asset.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

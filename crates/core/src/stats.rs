// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate batch statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters across all chest sessions of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Chest sessions that opened successfully
    pub sessions: u64,
    /// Operations whose callback ran (successfully or not)
    pub executed: u64,
    /// Batches that carried a single operation
    pub individual_ops: u64,
    /// Operations that shared a session with at least one other
    pub grouped_ops: u64,
    /// Chest opens avoided by grouping (batch size minus one, per batch)
    pub resource_opens_saved: u64,
    pub last_execution: Option<DateTime<Utc>>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed session into the counters
    pub fn record_batch(&mut self, batch_size: usize, executed: usize, completed_at: DateTime<Utc>) {
        self.sessions += 1;
        self.executed += executed as u64;
        if batch_size > 1 {
            self.grouped_ops += batch_size as u64;
            self.resource_opens_saved += (batch_size - 1) as u64;
        } else {
            self.individual_ops += batch_size as u64;
        }
        self.last_execution = Some(completed_at);
    }

    /// Share of would-be chest opens that grouping eliminated
    pub fn opens_saved_ratio(&self) -> f64 {
        let would_be_opens = self.sessions + self.resource_opens_saved;
        if would_be_opens == 0 {
            return 0.0;
        }
        self.resource_opens_saved as f64 / would_be_opens as f64
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;

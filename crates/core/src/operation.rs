// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation descriptors for the coordination queue
//!
//! An operation is one requested unit of chest work. The descriptor
//! carried by the queue is pure data; the side-effecting callback lives
//! in the engine's registry, keyed by kind (dedup guarantees at most
//! one pending operation per kind).

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The three activities that share a single chest session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Feeding,
    Cleaning,
    Maintenance,
}

impl OperationKind {
    /// Fixed execution priority; lower runs first
    pub fn priority(self) -> u8 {
        match self {
            OperationKind::Feeding => 1,
            OperationKind::Cleaning => 2,
            OperationKind::Maintenance => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Feeding => "feeding",
            OperationKind::Cleaning => "cleaning",
            OperationKind::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused an operation to be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    Manual,
    InventoryFull,
    BrokenUnitDetected,
    SingleTimeout,
    DoubleTimeout,
    FeedingSchedule,
}

impl TriggerReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerReason::Manual => "manual",
            TriggerReason::InventoryFull => "inventory_full",
            TriggerReason::BrokenUnitDetected => "broken_unit_detected",
            TriggerReason::SingleTimeout => "single_timeout",
            TriggerReason::DoubleTimeout => "double_timeout",
            TriggerReason::FeedingSchedule => "feeding_schedule",
        }
    }
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation as stored in the queue
///
/// `seq` is assigned by the queue on acceptance and breaks priority
/// ties by insertion order. `queued_at` is diagnostic only.
#[derive(Debug, Clone)]
pub struct QueuedOperation {
    pub kind: OperationKind,
    pub trigger: TriggerReason,
    pub context: String,
    pub queued_at: Instant,
    pub seq: u64,
}

impl QueuedOperation {
    pub fn priority(&self) -> u8 {
        self.kind.priority()
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation queue state machine with debounce batching
//!
//! A deduplicating, priority-ordered queue of pending chest operations.
//! The first operation to arrive in an empty queue arms a debounce
//! timer (via the `StartDebounce` effect); operations arriving inside
//! the window join the same batch. Additions are rejected while a batch
//! executes, which breaks the feedback loop where a failed operation's
//! side effects would re-trigger the same kind mid-session.
//!
//! The machine is pure. The engine wraps it in a mutex scoped tightly
//! around mutation and never holds that lock across blocking I/O.

use crate::clock::Clock;
use crate::effect::{Effect, Event};
use crate::operation::{OperationKind, QueuedOperation, TriggerReason};
use std::time::{Duration, Instant};

/// Result of an add attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl AddOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, AddOutcome::Accepted)
    }
}

/// Why an add attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// An operation of the same kind is already queued
    DuplicateKind,
    /// A batch is currently executing
    ExecutionInProgress,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::DuplicateKind => "duplicate_kind",
            RejectReason::ExecutionInProgress => "execution_in_progress",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deduplicating priority queue of pending operations
#[derive(Debug, Clone)]
pub struct OperationQueue {
    items: Vec<QueuedOperation>,
    executing: bool,
    /// Bumped on every empty-to-non-empty transition; debounce timers
    /// carry the epoch they were armed for and stale fires are ignored
    epoch: u64,
    next_seq: u64,
    debounce_window: Duration,
    debounce_deadline: Option<Instant>,
}

impl OperationQueue {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            items: Vec::new(),
            executing: false,
            epoch: 0,
            next_seq: 0,
            debounce_window,
            debounce_deadline: None,
        }
    }

    /// Attempt to enqueue an operation
    ///
    /// At most one operation per kind may be pending, and nothing may
    /// be added while a batch runs. On the empty-to-non-empty
    /// transition the effects include `StartDebounce` for the new
    /// epoch; later arrivals ride the first arrival's timer.
    pub fn add(
        &self,
        kind: OperationKind,
        trigger: TriggerReason,
        context: impl Into<String>,
        clock: &impl Clock,
    ) -> (OperationQueue, AddOutcome, Vec<Effect>) {
        if self.executing {
            return self.reject(kind, RejectReason::ExecutionInProgress);
        }
        if self.has_operation(kind) {
            return self.reject(kind, RejectReason::DuplicateKind);
        }

        let context = context.into();
        let was_empty = self.items.is_empty();
        let op = QueuedOperation {
            kind,
            trigger,
            context: context.clone(),
            queued_at: clock.now(),
            seq: self.next_seq,
        };

        let mut items = self.items.clone();
        items.push(op);
        // Stable sort: equal priorities keep insertion (seq) order
        items.sort_by_key(|op| op.priority());

        let mut queue = OperationQueue {
            items,
            next_seq: self.next_seq + 1,
            ..self.clone()
        };

        let mut effects = Vec::new();
        if was_empty {
            queue.epoch += 1;
            queue.debounce_deadline = Some(clock.now() + self.debounce_window);
            effects.push(Effect::StartDebounce {
                epoch: queue.epoch,
                window: self.debounce_window,
            });
        }
        effects.push(Effect::Emit(Event::OperationQueued {
            kind,
            trigger,
            context,
            queue_len: queue.items.len(),
        }));

        (queue, AddOutcome::Accepted, effects)
    }

    fn reject(
        &self,
        kind: OperationKind,
        reason: RejectReason,
    ) -> (OperationQueue, AddOutcome, Vec<Effect>) {
        (
            self.clone(),
            AddOutcome::Rejected(reason),
            vec![Effect::Emit(Event::OperationRejected {
                kind,
                reason: reason.as_str().to_string(),
            })],
        )
    }

    /// Take ownership of the queued batch and mark execution in progress
    ///
    /// Returns the drained operations in execution order. An empty
    /// queue yields an empty batch and leaves state unchanged.
    pub fn begin_batch(&self) -> (OperationQueue, Vec<QueuedOperation>) {
        if self.items.is_empty() {
            return (self.clone(), Vec::new());
        }
        (
            OperationQueue {
                items: Vec::new(),
                executing: true,
                debounce_deadline: None,
                ..self.clone()
            },
            self.items.clone(),
        )
    }

    /// Clear execution state after a batch completes or aborts
    pub fn finish_batch(&self) -> OperationQueue {
        OperationQueue {
            executing: false,
            ..self.clone()
        }
    }

    /// Whether an operation of this kind is queued
    pub fn has_operation(&self, kind: OperationKind) -> bool {
        self.items.iter().any(|op| op.kind == kind)
    }

    /// Whether anything is queued or executing
    ///
    /// The fishing-cycle driver polls this before starting a new cast.
    pub fn has_pending(&self) -> bool {
        !self.items.is_empty() || self.executing
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn execution_in_progress(&self) -> bool {
        self.executing
    }

    /// Epoch a debounce fire must carry to be honored
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    /// When the current batch window closes, if one is open
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    /// Whether a debounce fire for the given epoch is still relevant
    pub fn accepts_fire(&self, epoch: u64) -> bool {
        self.epoch == epoch && !self.items.is_empty() && !self.executing
    }

    /// Peek the queued operations in execution order
    pub fn items(&self) -> &[QueuedOperation] {
        &self.items
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

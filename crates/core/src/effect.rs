// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for state machine orchestration
//!
//! State machines stay pure: instead of spawning timers or logging,
//! they return effects the engine executes and events observers can
//! subscribe to.

use crate::operation::{OperationKind, TriggerReason};
use crate::rotation::{PairIndex, UnitId};
use crate::traced::TracedEffect;
use std::time::Duration;

/// Effects are side effects that state machines request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Emit an event for other components to observe
    Emit(Event),
    /// Arm the debounce timer for the current queue epoch
    ///
    /// Only the empty-to-non-empty transition produces this, so at most
    /// one timer is live per epoch. A fire carrying a stale epoch must
    /// be ignored by the receiver.
    StartDebounce { epoch: u64, window: Duration },
}

impl TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Emit(_) => "emit",
            Effect::StartDebounce { .. } => "start_debounce",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit(event) => vec![("event", event.name().to_string())],
            Effect::StartDebounce { epoch, window } => vec![
                ("epoch", epoch.to_string()),
                ("window_ms", window.as_millis().to_string()),
            ],
        }
    }
}

/// Events emitted by state machines
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    // Queue events
    OperationQueued {
        kind: OperationKind,
        trigger: TriggerReason,
        context: String,
        queue_len: usize,
    },
    OperationRejected {
        kind: OperationKind,
        reason: String,
    },

    // Batch events
    BatchStarted {
        batch_id: String,
        size: usize,
    },
    OperationExecuted {
        batch_id: String,
        kind: OperationKind,
        success: bool,
    },
    BatchAborted {
        batch_id: String,
        reason: String,
    },
    BatchCompleted {
        batch_id: String,
        executed: usize,
        failed: usize,
        opens_saved: u64,
    },
    MaintenanceTriggered {
        batch_id: String,
        broken: Vec<UnitId>,
        empty: Vec<UnitId>,
        unbaited: Vec<UnitId>,
    },

    // Rotation events
    UseRegistered {
        unit: UnitId,
        uses: u32,
        success: bool,
    },
    PairSwitchPlanned {
        next_pair: PairIndex,
        first_unit: UnitId,
    },
    PairSwitchCommitted {
        pair: PairIndex,
        first_unit: UnitId,
    },
    PairUsesReset {
        pair: PairIndex,
    },
    UnitEquipped {
        unit: UnitId,
    },
    RotationInvariantViolated {
        pair: PairIndex,
    },
}

impl Event {
    /// Stable event name for filtering and log fields
    pub fn name(&self) -> &'static str {
        match self {
            Event::OperationQueued { .. } => "operation:queued",
            Event::OperationRejected { .. } => "operation:rejected",
            Event::BatchStarted { .. } => "batch:started",
            Event::OperationExecuted { .. } => "batch:operation",
            Event::BatchAborted { .. } => "batch:aborted",
            Event::BatchCompleted { .. } => "batch:completed",
            Event::MaintenanceTriggered { .. } => "batch:maintenance",
            Event::UseRegistered { .. } => "rotation:use",
            Event::PairSwitchPlanned { .. } => "rotation:switch:planned",
            Event::PairSwitchCommitted { .. } => "rotation:switch:committed",
            Event::PairUsesReset { .. } => "rotation:reset",
            Event::UnitEquipped { .. } => "rotation:equipped",
            Event::RotationInvariantViolated { .. } => "rotation:invariant",
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;

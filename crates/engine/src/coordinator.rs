// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation coordinator
//!
//! The trigger API the rest of the automation talks to. `add_operation`
//! is called from the fishing loop, timer callbacks, and command
//! handlers; the first operation into an empty queue arms a debounce
//! timer, and when it fires the drained batch runs through the executor
//! in one chest session.
//!
//! Two locks by design: the queue mutex guards queue mutation only and
//! is never held across I/O; the execution lock (inside the executor)
//! serializes batches. Queries like `has_pending` never block on a
//! running batch.

use crate::callbacks::{CallbackRegistry, OperationCallback};
use crate::executor::BatchExecutor;
use angler_adapters::{InputControl, MaintenanceProbe, ResourceSession};
use angler_core::{
    BatchStats, Clock, CoordinatorConfig, Effect, Event, IdGen, OperationKind, OperationQueue,
    PairIndex, QueuedOperation, Rotation, SwitchPlan, SystemClock, TracedEffect, TriggerReason,
    UnitId, UuidIdGen,
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Inner<R, I, P, C, G> {
    queue: Mutex<OperationQueue>,
    registry: CallbackRegistry,
    maintenance_handler: Mutex<Option<Arc<dyn OperationCallback>>>,
    rotation: Arc<Mutex<Rotation>>,
    stats: Mutex<BatchStats>,
    executor: BatchExecutor<R, I, P>,
    events: broadcast::Sender<Event>,
    clock: C,
    ids: G,
}

/// Shared handle to the operation coordinator
///
/// Cheap to clone; every trigger site gets its own handle instead of
/// reaching for a global.
pub struct Coordinator<R, I, P, C = SystemClock, G = UuidIdGen> {
    inner: Arc<Inner<R, I, P, C, G>>,
}

impl<R, I, P, C, G> Clone for Coordinator<R, I, P, C, G> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R, I, P> Coordinator<R, I, P>
where
    R: ResourceSession,
    I: InputControl,
    P: MaintenanceProbe,
{
    pub fn new(resource: R, input: I, probe: P, config: CoordinatorConfig) -> Self {
        Self::with_parts(resource, input, probe, config, SystemClock, UuidIdGen)
    }
}

impl<R, I, P, C, G> Coordinator<R, I, P, C, G>
where
    R: ResourceSession,
    I: InputControl,
    P: MaintenanceProbe,
    C: Clock + 'static,
    G: IdGen + 'static,
{
    /// Construct with explicit clock and id generator (tests inject
    /// `SequentialIdGen` here for stable batch ids)
    pub fn with_parts(
        resource: R,
        input: I,
        probe: P,
        config: CoordinatorConfig,
        clock: C,
        ids: G,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let rotation = Arc::new(Mutex::new(Rotation::new(config.usage_limit)));
        let executor = BatchExecutor::new(
            resource,
            input,
            probe,
            config.clone(),
            rotation.clone(),
            events.clone(),
        );
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(OperationQueue::new(config.debounce_window)),
                registry: CallbackRegistry::new(),
                maintenance_handler: Mutex::new(None),
                rotation,
                stats: Mutex::new(BatchStats::new()),
                executor,
                events,
                clock,
                ids,
            }),
        }
    }

    /// Request an operation; returns false when rejected
    ///
    /// Rejected while an operation of the same kind is already queued
    /// or a batch is executing. The callback is kept only on
    /// acceptance.
    pub fn add_operation(
        &self,
        kind: OperationKind,
        trigger: TriggerReason,
        callback: Arc<dyn OperationCallback>,
        context: impl Into<String>,
    ) -> bool {
        let (outcome, effects) = {
            let mut queue = self.inner.queue.lock().unwrap_or_else(|e| e.into_inner());
            let (next, outcome, effects) = queue.add(kind, trigger, context, &self.inner.clock);
            *queue = next;
            (outcome, effects)
        };
        if outcome.is_accepted() {
            self.inner.registry.insert(kind, callback);
            tracing::info!(kind = %kind, trigger = %trigger, "operation queued");
        } else {
            tracing::debug!(kind = %kind, trigger = %trigger, "operation rejected");
        }
        self.handle_effects(effects);
        outcome.is_accepted()
    }

    /// Standing handler for opportunistic maintenance
    ///
    /// Used when the probe reports work mid-session and no maintenance
    /// operation was queued.
    pub fn set_maintenance_handler(&self, callback: Arc<dyn OperationCallback>) {
        *self
            .inner
            .maintenance_handler
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(callback);
    }

    /// Debounce fire for a specific queue epoch; stale fires no-op
    pub async fn flush(&self, epoch: u64) {
        let batch = {
            let mut queue = self.inner.queue.lock().unwrap_or_else(|e| e.into_inner());
            if !queue.accepts_fire(epoch) {
                tracing::debug!(epoch, "debounce fire is stale or queue busy, ignoring");
                return;
            }
            let (next, ops) = queue.begin_batch();
            *queue = next;
            ops
        };
        self.run_drained(batch).await;
    }

    /// Drain and execute immediately, skipping the grouping window
    ///
    /// Returns false when there was nothing to run or a batch is
    /// already in flight.
    pub async fn flush_now(&self) -> bool {
        let batch = {
            let mut queue = self.inner.queue.lock().unwrap_or_else(|e| e.into_inner());
            if queue.execution_in_progress() || queue.is_empty() {
                return false;
            }
            let (next, ops) = queue.begin_batch();
            *queue = next;
            ops
        };
        self.run_drained(batch).await;
        true
    }

    async fn run_drained(&self, ops: Vec<QueuedOperation>) {
        if ops.is_empty() {
            return;
        }
        let size = ops.len();
        let batch: Vec<_> = ops
            .into_iter()
            .map(|op| {
                let callback = self.inner.registry.take(op.kind);
                (op, callback)
            })
            .collect();
        let maintenance = self
            .inner
            .maintenance_handler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let batch_id = self.inner.ids.next();

        let report = self
            .inner
            .executor
            .run_batch(&batch_id, batch, maintenance)
            .await;

        {
            let mut queue = self.inner.queue.lock().unwrap_or_else(|e| e.into_inner());
            let next = queue.finish_batch();
            *queue = next;
        }

        if let Some(report) = report {
            if !report.aborted {
                let mut stats = self.inner.stats.lock().unwrap_or_else(|e| e.into_inner());
                stats.record_batch(size, report.executed.len(), Utc::now());
            }
        }
    }

    fn handle_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            tracing::debug!(effect = effect.name(), fields = ?effect.fields(), "effect");
            match effect {
                Effect::Emit(event) => {
                    let _ = self.inner.events.send(event);
                }
                Effect::StartDebounce { epoch, window } => {
                    let this = self.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(window).await;
                        this.flush(epoch).await;
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Queue queries (never block on a running batch)
    // ------------------------------------------------------------------

    pub fn has_operation(&self, kind: OperationKind) -> bool {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .has_operation(kind)
    }

    /// Whether work is queued or a batch is executing; the fishing
    /// cycle waits on this before casting again
    pub fn has_pending(&self) -> bool {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .has_pending()
    }

    pub fn queue_size(&self) -> usize {
        self.inner.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn stats(&self) -> BatchStats {
        self.inner
            .stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Subscribe to queue, batch, and rotation events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Rotation pass-throughs
    // ------------------------------------------------------------------

    pub fn current_unit(&self) -> UnitId {
        self.inner
            .rotation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current_unit()
    }

    pub fn uses(&self, unit: UnitId) -> u32 {
        self.inner
            .rotation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .uses(unit)
    }

    pub fn pending_switch(&self) -> Option<SwitchPlan> {
        self.inner
            .rotation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending_switch()
            .cloned()
    }

    /// Count a use for a rod (success and timeout both count)
    ///
    /// Returns the first unit of the next pair when this use makes a
    /// switch due; the hand-off itself waits for the next batch.
    pub fn register_use(&self, unit: Option<UnitId>, success: bool) -> Option<UnitId> {
        let (due, effects) = {
            let mut rotation = self.inner.rotation.lock().unwrap_or_else(|e| e.into_inner());
            let (next, due, effects) = rotation.register_use(unit, success);
            *rotation = next;
            (due, effects)
        };
        self.handle_effects(effects);
        due
    }

    /// Apply a pending pair switch outside a batch (driver-forced)
    pub fn confirm_pair_switch(&self) -> bool {
        let (applied, effects) = {
            let mut rotation = self.inner.rotation.lock().unwrap_or_else(|e| e.into_inner());
            let (next, applied, effects) = rotation.confirm_pair_switch();
            *rotation = next;
            (applied, effects)
        };
        self.handle_effects(effects);
        applied
    }

    /// Zero a pair's counters after maintenance replaced its rods
    pub fn reset_pair_uses(&self, pair: PairIndex) {
        let effects = {
            let mut rotation = self.inner.rotation.lock().unwrap_or_else(|e| e.into_inner());
            let (next, effects) = rotation.reset_pair_uses(pair);
            *rotation = next;
            effects
        };
        self.handle_effects(effects);
    }

    // ------------------------------------------------------------------
    // Executor state
    // ------------------------------------------------------------------

    pub async fn resource_is_open(&self) -> bool {
        self.inner.executor.resource_is_open().await
    }

    pub async fn held_unit(&self) -> Option<UnitId> {
        self.inner.executor.held_unit().await
    }

    pub async fn set_held_unit(&self, unit: Option<UnitId>) {
        self.inner.executor.set_held_unit(unit).await
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

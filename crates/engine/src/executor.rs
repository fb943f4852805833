// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch executor
//!
//! Drives one chest session per batch:
//! halt input → stow held rod → open → run callbacks in priority order →
//! opportunistic maintenance check → close → re-equip.
//!
//! Every step catches its own failures; nothing propagates past the
//! batch entry point and the close step runs on every exit path, so a
//! misbehaving callback can never leave the chest open. The state
//! behind the execution lock is the only place that knows whether the
//! chest is open and which rod is in hand.

use crate::callbacks::OperationCallback;
use crate::error::EngineError;
use angler_adapters::{InputControl, MaintenanceProbe, ResourceSession};
use angler_core::{
    CoordinatorConfig, Effect, Event, OperationKind, QueuedOperation, Rotation, TracedEffect,
    UnitId,
};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Outcome of one batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch_id: String,
    /// Operations the batch was asked to run
    pub size: usize,
    /// Callbacks that actually ran, with their outcome
    pub executed: Vec<(OperationKind, bool)>,
    /// True when the chest never opened and nothing ran
    pub aborted: bool,
    /// True when the opportunistic check ran the maintenance handler
    pub maintenance_ran: bool,
    /// Rod in hand when the batch finished, if any
    pub equipped: Option<UnitId>,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.executed.iter().filter(|(_, ok)| !ok).count()
    }
}

/// Rod-in-hand and chest-open state, guarded by the execution lock
#[derive(Debug)]
struct ExecutorState {
    resource_open: bool,
    held_unit: Option<UnitId>,
}

/// Executes batches against the adapter collaborators
pub struct BatchExecutor<R, I, P> {
    resource: R,
    input: I,
    probe: P,
    config: CoordinatorConfig,
    rotation: Arc<Mutex<Rotation>>,
    events: broadcast::Sender<Event>,
    state: tokio::sync::Mutex<ExecutorState>,
}

impl<R, I, P> BatchExecutor<R, I, P>
where
    R: ResourceSession,
    I: InputControl,
    P: MaintenanceProbe,
{
    pub fn new(
        resource: R,
        input: I,
        probe: P,
        config: CoordinatorConfig,
        rotation: Arc<Mutex<Rotation>>,
        events: broadcast::Sender<Event>,
    ) -> Self {
        let held_unit = {
            let rotation = rotation.lock().unwrap_or_else(|e| e.into_inner());
            Some(rotation.current_unit())
        };
        Self {
            resource,
            input,
            probe,
            config,
            rotation,
            events,
            state: tokio::sync::Mutex::new(ExecutorState {
                resource_open: false,
                held_unit,
            }),
        }
    }

    /// Whether a chest session is believed open right now
    pub async fn resource_is_open(&self) -> bool {
        self.state.lock().await.resource_open
    }

    /// Rod currently tracked as in hand
    pub async fn held_unit(&self) -> Option<UnitId> {
        self.state.lock().await.held_unit
    }

    /// Override the tracked in-hand rod (driver startup, manual swaps)
    pub async fn set_held_unit(&self, unit: Option<UnitId>) {
        self.state.lock().await.held_unit = unit;
    }

    /// Run one batch to completion
    ///
    /// Returns `None` without touching anything when a batch is already
    /// in flight — a debounce fire racing an in-progress batch is a
    /// no-op by contract.
    pub async fn run_batch(
        &self,
        batch_id: &str,
        batch: Vec<(QueuedOperation, Option<Arc<dyn OperationCallback>>)>,
        maintenance: Option<Arc<dyn OperationCallback>>,
    ) -> Option<BatchReport> {
        let Ok(mut state) = self.state.try_lock() else {
            tracing::warn!(batch_id, "batch already in flight, ignoring fire");
            return None;
        };

        let span = tracing::info_span!("batch", id = batch_id, size = batch.len());
        let _guard = span.enter();

        let mut report = BatchReport {
            batch_id: batch_id.to_string(),
            size: batch.len(),
            executed: Vec::new(),
            aborted: false,
            maintenance_ran: false,
            equipped: None,
        };
        self.emit(Event::BatchStarted {
            batch_id: batch_id.to_string(),
            size: batch.len(),
        });

        // Step 1: settle continuous input before the open gesture
        if let Err(e) = self.preempt_input().await {
            tracing::warn!(step = "preempt_input", error = %e, "continuing");
        }

        // Step 2: stow the rod in hand; it is the default re-equip candidate
        let removed = self.stow_held(&mut state).await;

        // Step 3: open the chest; failure aborts the whole batch unexecuted
        match self.resource.open().await {
            Ok(()) => state.resource_open = true,
            Err(e) => {
                tracing::error!(step = "acquire", error = %e, "aborting batch");
                self.emit(Event::BatchAborted {
                    batch_id: batch_id.to_string(),
                    reason: e.to_string(),
                });
                report.aborted = true;
                self.release(&mut state).await;
                self.restore_held(&mut state, removed, &mut report).await;
                return Some(report);
            }
        }

        // Step 4: run callbacks in priority order; failures don't abort
        for (op, callback) in &batch {
            let success = match callback {
                Some(callback) => callback.run().await,
                None => {
                    tracing::warn!(kind = %op.kind, "no callback registered");
                    false
                }
            };
            if !success {
                tracing::warn!(kind = %op.kind, context = %op.context, "operation failed");
            }
            report.executed.push((op.kind, success));
            self.emit(Event::OperationExecuted {
                batch_id: batch_id.to_string(),
                kind: op.kind,
                success,
            });
        }

        // Step 5: while the chest is open anyway, check for maintenance
        self.opportunistic_check(batch_id, &batch, maintenance, &mut report)
            .await;

        // Step 6: always release, even after earlier failures
        self.release(&mut state).await;

        // Step 7: exactly one re-equip path
        self.reequip(&mut state, removed, &mut report).await;

        let failed = report.failures();
        self.emit(Event::BatchCompleted {
            batch_id: batch_id.to_string(),
            executed: report.executed.len(),
            failed,
            opens_saved: report.size.saturating_sub(1) as u64,
        });
        tracing::info!(
            executed = report.executed.len(),
            failed,
            maintenance_ran = report.maintenance_ran,
            "batch complete"
        );
        Some(report)
    }

    async fn preempt_input(&self) -> Result<(), EngineError> {
        self.input.halt_continuous_actions().await?;
        self.input.release_all_buttons().await?;
        tokio::time::sleep(self.config.input_settle).await;
        Ok(())
    }

    async fn stow_held(&self, state: &mut ExecutorState) -> Option<UnitId> {
        let held = state.held_unit.take()?;
        if let Err(e) = self.input.press(&held.hotbar_key()).await {
            tracing::warn!(step = "stow", unit = %held, error = %e, "continuing");
        }
        Some(held)
    }

    async fn opportunistic_check(
        &self,
        batch_id: &str,
        batch: &[(QueuedOperation, Option<Arc<dyn OperationCallback>>)],
        maintenance: Option<Arc<dyn OperationCallback>>,
        report: &mut BatchReport,
    ) {
        let has = |kind: OperationKind| batch.iter().any(|(op, _)| op.kind == kind);
        let worth_checking = (has(OperationKind::Feeding) || has(OperationKind::Cleaning))
            && !has(OperationKind::Maintenance);
        if !worth_checking {
            return;
        }

        match self.probe.is_needed().await {
            Ok(found) if found.needed => {
                self.emit(Event::MaintenanceTriggered {
                    batch_id: batch_id.to_string(),
                    broken: found.broken.clone(),
                    empty: found.empty.clone(),
                    unbaited: found.unbaited.clone(),
                });
                match maintenance {
                    Some(callback) => {
                        let success = callback.run().await;
                        if !success {
                            tracing::warn!(step = "opportunistic", "maintenance failed");
                        }
                        report.maintenance_ran = true;
                    }
                    None => {
                        tracing::warn!(step = "opportunistic", "needed but no handler set")
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(step = "opportunistic", error = %e, "probe failed"),
        }
    }

    /// Close the chest and clear the local open flag no matter what
    ///
    /// A failed close is logged and the flag clears anyway: a stuck
    /// "open" belief would block every future batch, while a
    /// desynchronized chest heals on the next open.
    async fn release(&self, state: &mut ExecutorState) {
        if let Err(e) = self.resource.close().await {
            tracing::warn!(step = "release", error = %e, "close failed, clearing state");
        }
        state.resource_open = false;
    }

    async fn reequip(
        &self,
        state: &mut ExecutorState,
        removed: Option<UnitId>,
        report: &mut BatchReport,
    ) {
        let plan = {
            let rotation = self.rotation.lock().unwrap_or_else(|e| e.into_inner());
            rotation.pending_switch().cloned()
        };

        if let Some(plan) = plan {
            // Path a: hand over to the next pair, then commit the switch
            if let Err(e) = self.equip(plan.first_unit).await {
                tracing::error!(step = "reequip", unit = %plan.first_unit, error = %e,
                    "equip failed, switch stays pending");
                return;
            }
            let effects = {
                let mut rotation = self.rotation.lock().unwrap_or_else(|e| e.into_inner());
                let (next, applied, effects) = rotation.confirm_pair_switch();
                *rotation = next;
                debug_assert!(applied);
                effects
            };
            self.apply_effects(effects);
            self.emit(Event::UnitEquipped {
                unit: plan.first_unit,
            });
            state.held_unit = Some(plan.first_unit);
            report.equipped = Some(plan.first_unit);
        } else if removed.is_some() {
            // Path b: same pair, lowest usage first
            let choice = {
                let rotation = self.rotation.lock().unwrap_or_else(|e| e.into_inner());
                rotation.choose_next_unit_by_usage()
            };
            match choice {
                Ok(unit) => {
                    if let Err(e) = self.equip(unit).await {
                        tracing::error!(step = "reequip", unit = %unit, error = %e, "equip failed");
                        return;
                    }
                    let effects = {
                        let mut rotation =
                            self.rotation.lock().unwrap_or_else(|e| e.into_inner());
                        let (next, effects) = rotation.mark_equipped(unit);
                        *rotation = next;
                        effects
                    };
                    self.apply_effects(effects);
                    state.held_unit = Some(unit);
                    report.equipped = Some(unit);
                }
                Err(e) => {
                    // Both rods spent with no switch planned: a logic bug
                    // upstream. Refuse to guess, leave the hand empty.
                    let pair = {
                        let rotation = self.rotation.lock().unwrap_or_else(|e| e.into_inner());
                        rotation.active_pair()
                    };
                    tracing::error!(step = "reequip", error = %e, "skipping re-equip");
                    self.emit(Event::RotationInvariantViolated { pair });
                }
            }
        }
        // Path c: hand was empty before the session; nothing to re-equip
    }

    /// Put the stowed rod back after an aborted batch
    ///
    /// No rotation decisions on the abort path: the session never
    /// happened, so the hand goes back to exactly what it held.
    async fn restore_held(
        &self,
        state: &mut ExecutorState,
        removed: Option<UnitId>,
        report: &mut BatchReport,
    ) {
        let Some(unit) = removed else { return };
        if let Err(e) = self.equip(unit).await {
            tracing::warn!(step = "restore", unit = %unit, error = %e, "equip failed");
            return;
        }
        state.held_unit = Some(unit);
        report.equipped = Some(unit);
    }

    async fn equip(&self, unit: UnitId) -> Result<(), EngineError> {
        self.input.press(&unit.hotbar_key()).await?;
        tokio::time::sleep(self.config.equip_delay).await;
        Ok(())
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine; events are observability, not control flow
        let _ = self.events.send(event);
    }

    fn apply_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            tracing::debug!(effect = effect.name(), fields = ?effect.fields(), "effect");
            if let Effect::Emit(event) = effect {
                self.emit(event);
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

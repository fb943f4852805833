// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rod rotation state machine
//!
//! Six rod slots are grouped into three fixed pairs {1,2}, {3,4}, {5,6}.
//! One pair is active at a time; uses are counted per rod, and when both
//! rods of the active pair reach the usage limit a switch to the next
//! pair is planned. The plan is applied in two phases: `register_use`
//! computes and stores it, `confirm_pair_switch` commits it. The split
//! exists because the physical hand-off must happen inside an open chest
//! session, after every other operation — until the commit, the rest of
//! the system keeps reading the old pair consistently.
//!
//! ## Invariants
//!
//! - A use is counted on success and on timeout alike.
//! - Both counters of a pair are zeroed exactly when that pair becomes
//!   active (construction, confirmed switch) or on an explicit reset
//!   after maintenance replenishes the rods.
//! - At most one pending switch exists; no new plan is computed while
//!   one is outstanding.

use crate::effect::{Effect, Event};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six rod slots, numbered 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(u8);

impl UnitId {
    pub const COUNT: usize = 6;

    /// Create a unit id; `None` unless 1..=6
    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::COUNT as u8).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based ledger index
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The fixed pair this unit belongs to
    pub fn pair(self) -> PairIndex {
        PairIndex((self.0 - 1) / 2)
    }

    /// Hotbar key that equips or stows this rod
    pub fn hotbar_key(self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the three fixed rod pairs, numbered 0..=2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairIndex(u8);

impl PairIndex {
    pub const COUNT: usize = 3;

    /// Create a pair index; `None` unless 0..=2
    pub fn new(n: u8) -> Option<Self> {
        (n < Self::COUNT as u8).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The two units of this pair; assignment is static
    pub fn units(self) -> [UnitId; 2] {
        [UnitId(self.0 * 2 + 1), UnitId(self.0 * 2 + 2)]
    }

    /// The pair that rotates in after this one
    pub fn next(self) -> PairIndex {
        PairIndex((self.0 + 1) % Self::COUNT as u8)
    }
}

impl std::fmt::Display for PairIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-unit use counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedger {
    uses: [u32; UnitId::COUNT],
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uses(&self, unit: UnitId) -> u32 {
        self.uses[unit.index()]
    }

    /// Count one use for the unit
    pub fn record(&self, unit: UnitId) -> Self {
        let mut uses = self.uses;
        uses[unit.index()] = uses[unit.index()].saturating_add(1);
        Self { uses }
    }

    /// Zero both counters of a pair
    pub fn reset_pair(&self, pair: PairIndex) -> Self {
        let mut uses = self.uses;
        for unit in pair.units() {
            uses[unit.index()] = 0;
        }
        Self { uses }
    }

    /// True when both units of the pair have reached the limit
    pub fn pair_exhausted(&self, pair: PairIndex, limit: u32) -> bool {
        pair.units().iter().all(|u| self.uses(*u) >= limit)
    }
}

/// A computed-but-not-yet-applied pair rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPlan {
    pub next_pair: PairIndex,
    pub first_unit: UnitId,
}

/// Rotation phase as a tagged state, so callers must handle the pending
/// case before reading the active pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationPhase {
    Stable,
    PendingSwitch(SwitchPlan),
}

/// Errors surfaced by the rotation machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// Both rods of the active pair are at/over the limit and no switch
    /// was planned. A logic bug upstream, not a state to guess around.
    #[error("both units of pair {pair} at usage limit with no pending switch")]
    BothUnitsExhausted { pair: PairIndex },
}

/// The rod rotation state machine
#[derive(Debug, Clone)]
pub struct Rotation {
    ledger: UsageLedger,
    active_pair: PairIndex,
    /// Which of the pair's two slots is in use (0 or 1)
    active_slot: usize,
    usage_limit: u32,
    phase: RotationPhase,
}

impl Rotation {
    /// Start with pair {1,2} active and all counters zeroed
    pub fn new(usage_limit: u32) -> Self {
        Self {
            ledger: UsageLedger::new(),
            active_pair: PairIndex(0),
            active_slot: 0,
            usage_limit,
            phase: RotationPhase::Stable,
        }
    }

    pub fn current_unit(&self) -> UnitId {
        self.active_pair.units()[self.active_slot]
    }

    pub fn active_pair(&self) -> PairIndex {
        self.active_pair
    }

    pub fn usage_limit(&self) -> u32 {
        self.usage_limit
    }

    pub fn uses(&self, unit: UnitId) -> u32 {
        self.ledger.uses(unit)
    }

    pub fn phase(&self) -> &RotationPhase {
        &self.phase
    }

    pub fn pending_switch(&self) -> Option<&SwitchPlan> {
        match &self.phase {
            RotationPhase::Stable => None,
            RotationPhase::PendingSwitch(plan) => Some(plan),
        }
    }

    /// Count one use and evaluate the pair-switch threshold
    ///
    /// Success and timeout both consume a use. When the increment
    /// brings both units of the active pair to the limit and no switch
    /// is outstanding, a plan for the next pair is stored and its first
    /// unit returned so the caller can defer or execute the hand-off.
    pub fn register_use(
        &self,
        unit: Option<UnitId>,
        success: bool,
    ) -> (Rotation, Option<UnitId>, Vec<Effect>) {
        let unit = unit.unwrap_or_else(|| self.current_unit());
        let ledger = self.ledger.record(unit);
        let mut effects = vec![Effect::Emit(Event::UseRegistered {
            unit,
            uses: ledger.uses(unit),
            success,
        })];

        let switch_due = matches!(self.phase, RotationPhase::Stable)
            && ledger.pair_exhausted(self.active_pair, self.usage_limit);

        if switch_due {
            let next_pair = self.active_pair.next();
            let first_unit = next_pair.units()[0];
            let plan = SwitchPlan {
                next_pair,
                first_unit,
            };
            effects.push(Effect::Emit(Event::PairSwitchPlanned {
                next_pair,
                first_unit,
            }));
            (
                Rotation {
                    ledger,
                    phase: RotationPhase::PendingSwitch(plan),
                    ..self.clone()
                },
                Some(first_unit),
                effects,
            )
        } else {
            (
                Rotation {
                    ledger,
                    ..self.clone()
                },
                None,
                effects,
            )
        }
    }

    /// Apply an outstanding switch plan
    ///
    /// Sets the new pair active on its first unit, zeroes both new
    /// counters, and clears the plan. Idempotent: returns false and
    /// leaves state unchanged when nothing is pending.
    pub fn confirm_pair_switch(&self) -> (Rotation, bool, Vec<Effect>) {
        match &self.phase {
            RotationPhase::Stable => (self.clone(), false, vec![]),
            RotationPhase::PendingSwitch(plan) => {
                let effects = vec![Effect::Emit(Event::PairSwitchCommitted {
                    pair: plan.next_pair,
                    first_unit: plan.first_unit,
                })];
                (
                    Rotation {
                        ledger: self.ledger.reset_pair(plan.next_pair),
                        active_pair: plan.next_pair,
                        active_slot: 0,
                        phase: RotationPhase::Stable,
                        ..self.clone()
                    },
                    true,
                    effects,
                )
            }
        }
    }

    /// Pick the unit of the active pair with strictly fewer uses
    ///
    /// Equal usage alternates away from the current slot. Both units
    /// at/over the limit is an invariant violation, never a guess.
    pub fn choose_next_unit_by_usage(&self) -> Result<UnitId, RotationError> {
        let units = self.active_pair.units();
        if self.ledger.pair_exhausted(self.active_pair, self.usage_limit) {
            return Err(RotationError::BothUnitsExhausted {
                pair: self.active_pair,
            });
        }

        let uses = [self.ledger.uses(units[0]), self.ledger.uses(units[1])];
        let slot = match uses[0].cmp(&uses[1]) {
            std::cmp::Ordering::Less => 0,
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Equal => 1 - self.active_slot,
        };
        Ok(units[slot])
    }

    /// Zero a pair's counters without changing the active selection
    ///
    /// Used after maintenance replaces the physical rods.
    pub fn reset_pair_uses(&self, pair: PairIndex) -> (Rotation, Vec<Effect>) {
        (
            Rotation {
                ledger: self.ledger.reset_pair(pair),
                ..self.clone()
            },
            vec![Effect::Emit(Event::PairUsesReset { pair })],
        )
    }

    /// Track which slot ended up in hand after an equip
    ///
    /// Only units of the active pair move the slot; equipping the first
    /// unit of a not-yet-committed next pair changes nothing here.
    pub fn mark_equipped(&self, unit: UnitId) -> (Rotation, Vec<Effect>) {
        let effects = vec![Effect::Emit(Event::UnitEquipped { unit })];
        let units = self.active_pair.units();
        match units.iter().position(|u| *u == unit) {
            Some(slot) => (
                Rotation {
                    active_slot: slot,
                    ..self.clone()
                },
                effects,
            ),
            None => (self.clone(), effects),
        }
    }
}

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod tests;

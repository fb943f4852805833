// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maintenance probe adapter
//!
//! Screen-side check for rods that need replacing: broken, out of
//! durability, or missing bait. Consulted opportunistically while a
//! chest session is already open, so a needed maintenance pass avoids
//! paying for a second session.

use angler_core::UnitId;
use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProbe;

/// Errors from the maintenance probe
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("probe failed: {0}")]
    Failed(String),
}

/// What the probe found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub needed: bool,
    pub broken: Vec<UnitId>,
    pub empty: Vec<UnitId>,
    pub unbaited: Vec<UnitId>,
}

impl MaintenanceReport {
    /// Nothing to do
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn with_broken(mut self, units: Vec<UnitId>) -> Self {
        self.needed = self.needed || !units.is_empty();
        self.broken = units;
        self
    }

    pub fn with_empty(mut self, units: Vec<UnitId>) -> Self {
        self.needed = self.needed || !units.is_empty();
        self.empty = units;
        self
    }

    pub fn with_unbaited(mut self, units: Vec<UnitId>) -> Self {
        self.needed = self.needed || !units.is_empty();
        self.unbaited = units;
        self
    }
}

/// Adapter for the maintenance-need check
#[async_trait]
pub trait MaintenanceProbe: Clone + Send + Sync + 'static {
    async fn is_needed(&self) -> Result<MaintenanceReport, ProbeError>;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake maintenance probe for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MaintenanceProbe, MaintenanceReport, ProbeError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Fake probe returning a scripted report
#[derive(Clone, Default)]
pub struct FakeProbe {
    report: Arc<Mutex<MaintenanceReport>>,
    checks: Arc<Mutex<u64>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the report the next checks will return
    pub fn set_report(&self, report: MaintenanceReport) {
        *self.report.lock().unwrap_or_else(|e| e.into_inner()) = report;
    }

    /// How many times the probe was consulted
    pub fn check_count(&self) -> u64 {
        *self.checks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MaintenanceProbe for FakeProbe {
    async fn is_needed(&self) -> Result<MaintenanceReport, ProbeError> {
        *self.checks.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(self.report.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use angler_core::UnitId;

    #[tokio::test]
    async fn default_report_is_clear() {
        let probe = FakeProbe::new();
        let report = probe.is_needed().await.unwrap();
        assert!(!report.needed);
        assert_eq!(probe.check_count(), 1);
    }

    #[tokio::test]
    async fn scripted_report_is_returned() {
        let probe = FakeProbe::new();
        let broken = vec![UnitId::new(2).unwrap()];
        probe.set_report(MaintenanceReport::clear().with_broken(broken.clone()));

        let report = probe.is_needed().await.unwrap();
        assert!(report.needed);
        assert_eq!(report.broken, broken);
    }
}

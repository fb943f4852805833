// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake resource session for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ResourceError, ResourceSession};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded resource call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceCall {
    Open,
    Close,
}

#[derive(Debug, Default)]
struct FakeResourceState {
    open: bool,
    open_count: u64,
    close_count: u64,
    fail_opens: u32,
    fail_closes: u32,
    calls: Vec<ResourceCall>,
}

/// Fake resource session with scripted failures and call recording
#[derive(Clone, Default)]
pub struct FakeResource {
    state: Arc<Mutex<FakeResourceState>>,
}

impl FakeResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next `n` open attempts to fail
    pub fn fail_next_opens(&self, n: u32) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_opens = n;
    }

    /// Script the next `n` close attempts to fail
    pub fn fail_next_closes(&self, n: u32) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_closes = n;
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).open
    }

    pub fn open_count(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).open_count
    }

    pub fn close_count(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).close_count
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ResourceCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl ResourceSession for FakeResource {
    async fn open(&self) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ResourceCall::Open);
        if state.fail_opens > 0 {
            state.fail_opens -= 1;
            return Err(ResourceError::OpenFailed("scripted failure".into()));
        }
        state.open = true;
        state.open_count += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ResourceCall::Close);
        if state.fail_closes > 0 {
            state.fail_closes -= 1;
            return Err(ResourceError::CloseFailed("scripted failure".into()));
        }
        // Closing an unopened chest is a no-op, not an error
        state.open = false;
        state.close_count += 1;
        Ok(())
    }
}

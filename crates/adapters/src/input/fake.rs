// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake input relay for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{InputControl, InputError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded input call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCall {
    HaltContinuousActions,
    ReleaseAllButtons,
    Press(String),
    Hold(String),
    Release(String),
}

/// Fake input relay that records every primitive call
#[derive(Clone, Default)]
pub struct FakeInput {
    calls: Arc<Mutex<Vec<InputCall>>>,
}

impl FakeInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<InputCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Keys pressed, in order
    pub fn presses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                InputCall::Press(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: InputCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

#[async_trait]
impl InputControl for FakeInput {
    async fn halt_continuous_actions(&self) -> Result<(), InputError> {
        self.record(InputCall::HaltContinuousActions);
        Ok(())
    }

    async fn release_all_buttons(&self) -> Result<(), InputError> {
        self.record(InputCall::ReleaseAllButtons);
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<(), InputError> {
        self.record(InputCall::Press(key.to_string()));
        Ok(())
    }

    async fn hold(&self, key: &str) -> Result<(), InputError> {
        self.record(InputCall::Hold(key.to_string()));
        Ok(())
    }

    async fn release(&self, key: &str) -> Result<(), InputError> {
        self.record(InputCall::Release(key.to_string()));
        Ok(())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input relay adapter
//!
//! Thin contract over the key/mouse injection layer (software-simulated
//! or hardware-relayed; the coordinator does not care which). Timing
//! variance for anti-detection lives inside implementations, fed by the
//! `action_jitter` config value.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeInput, InputCall};

/// Errors from the input relay
#[derive(Debug, Clone, Error)]
pub enum InputError {
    #[error("input relay unavailable: {0}")]
    Unavailable(String),
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

/// Adapter for low-level input primitives
#[async_trait]
pub trait InputControl: Clone + Send + Sync + 'static {
    /// Stop repeated clicks and held movement keys and wait for them to
    /// settle; continuous background actions corrupt the chest-open
    /// gesture
    async fn halt_continuous_actions(&self) -> Result<(), InputError>;

    /// Release every held mouse button and key
    async fn release_all_buttons(&self) -> Result<(), InputError>;

    async fn press(&self, key: &str) -> Result<(), InputError>;

    async fn hold(&self, key: &str) -> Result<(), InputError>;

    async fn release(&self, key: &str) -> Result<(), InputError>;
}

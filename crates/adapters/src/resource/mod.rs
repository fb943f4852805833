// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chest session adapter
//!
//! One open/close cycle of the shared chest is a resource session. The
//! open gesture is expensive and fragile, which is why the coordinator
//! batches every operation it can into a single session.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResource, ResourceCall};

/// Errors from resource session operations
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("failed to open resource: {0}")]
    OpenFailed(String),
    #[error("failed to close resource: {0}")]
    CloseFailed(String),
}

/// Adapter for the expensive open/close primitive
#[async_trait]
pub trait ResourceSession: Clone + Send + Sync + 'static {
    /// Open the chest; retried internally by implementations, a
    /// returned error means the session cannot start
    async fn open(&self) -> Result<(), ResourceError>;

    /// Close the chest
    ///
    /// Must be safe to call even when `open` never succeeded.
    async fn close(&self) -> Result<(), ResourceError>;
}

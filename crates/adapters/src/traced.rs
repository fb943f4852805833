// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::resource::{ResourceError, ResourceSession};
use async_trait::async_trait;

/// Wrapper that adds tracing to any ResourceSession
#[derive(Clone)]
pub struct TracedResourceSession<R> {
    inner: R,
}

impl<R> TracedResourceSession<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: ResourceSession> ResourceSession for TracedResourceSession<R> {
    async fn open(&self) -> Result<(), ResourceError> {
        let span = tracing::info_span!("resource.open");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.open().await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "opened"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "open failed"
            ),
        }

        result
    }

    async fn close(&self) -> Result<(), ResourceError> {
        let span = tracing::info_span!("resource.close");
        let _guard = span.enter();

        let result = self.inner.close().await;
        // close() failing is tolerated upstream (local state clears anyway)
        match &result {
            Ok(()) => tracing::info!("closed"),
            Err(e) => tracing::warn!(error = %e, "close failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

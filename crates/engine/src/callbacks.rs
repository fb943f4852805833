// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation callbacks and their registry
//!
//! Every queued operation carries its work as an `OperationCallback`
//! supplied by the feeding, cleaning, or maintenance subsystem. The
//! queue itself stays pure data; callbacks live here, keyed by kind —
//! the dedup rule (at most one pending operation per kind) is what
//! makes the kind a valid key. A callback is removed when its batch
//! drains, runs exactly once, and is then dropped.

use angler_core::OperationKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// The work behind one queued operation
///
/// Runs inside an open chest session. Returns true on success; failures
/// are recorded per operation and never abort the rest of the batch.
#[async_trait]
pub trait OperationCallback: Send + Sync {
    async fn run(&self) -> bool;
}

/// Adapter turning an async closure into a callback
pub struct FnCallback<F> {
    f: F,
}

impl<F, Fut> FnCallback<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> OperationCallback for FnCallback<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn run(&self) -> bool {
        (self.f)().await
    }
}

/// Pending callbacks, one slot per operation kind
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: Mutex<HashMap<OperationKind, Arc<dyn OperationCallback>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the callback for a freshly accepted operation
    pub fn insert(&self, kind: OperationKind, callback: Arc<dyn OperationCallback>) {
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(kind, callback);
    }

    /// Remove and return the callback for a drained operation
    pub fn take(&self, kind: OperationKind) -> Option<Arc<dyn OperationCallback>> {
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&kind)
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn fn_callback_runs_the_closure() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let callback = FnCallback::new(move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                true
            }
        });

        assert!(callback.run().await);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn registry_take_consumes_the_slot() {
        let registry = CallbackRegistry::new();
        registry.insert(
            OperationKind::Feeding,
            Arc::new(FnCallback::new(|| async { true })),
        );
        assert_eq!(registry.len(), 1);

        assert!(registry.take(OperationKind::Feeding).is_some());
        assert!(registry.take(OperationKind::Feeding).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn insert_replaces_by_kind() {
        let registry = CallbackRegistry::new();
        registry.insert(
            OperationKind::Cleaning,
            Arc::new(FnCallback::new(|| async { false })),
        );
        registry.insert(
            OperationKind::Cleaning,
            Arc::new(FnCallback::new(|| async { true })),
        );
        assert_eq!(registry.len(), 1);

        let callback = registry.take(OperationKind::Cleaning).unwrap();
        assert!(callback.run().await);
    }
}

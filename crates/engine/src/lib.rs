// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! angler execution engine
//!
//! Owns the locks around the pure state machines and drives chest
//! sessions: the coordinator accepts operation requests and arms the
//! debounce timer; the batch executor runs the
//! halt-input → open → execute → opportunistic-check → close → re-equip
//! sequence exactly once per batch.

mod callbacks;
mod coordinator;
mod error;
mod executor;

pub use callbacks::{CallbackRegistry, FnCallback, OperationCallback};
pub use coordinator::Coordinator;
pub use error::EngineError;
pub use executor::{BatchExecutor, BatchReport};

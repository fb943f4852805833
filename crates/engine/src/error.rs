// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use angler_adapters::{InputError, ProbeError, ResourceError};
use angler_core::RotationError;
use thiserror::Error;

/// Errors that can occur while driving a batch
///
/// These never escape the batch entry point; each executor step catches
/// and logs them so the release step always runs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),
    #[error("rotation error: {0}")]
    Rotation(#[from] RotationError),
}

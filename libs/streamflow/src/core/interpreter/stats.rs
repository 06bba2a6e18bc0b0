// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::Serialize;

use crate::core::error::{Result, StreamError};

/// Counters accumulated by one interpreter over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InterpreterStats {
    pub interpret_calls: u64,
    /// Passes over the sinks, including the final pass that made no progress.
    pub passes: u64,
    pub pulls: u64,
    /// Pulls abandoned because data was needed from outside the section.
    pub stalled_pulls: u64,
    pub firings: u64,
}

impl InterpreterStats {
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| StreamError::Other(e.into()))
    }
}

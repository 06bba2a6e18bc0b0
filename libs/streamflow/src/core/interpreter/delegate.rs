// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::error::Result;
use crate::core::graph::{StreamGraph, WorkerId};

/// Hook invoked by the interpreter after every firing.
pub trait FiringDelegate<T>: Send + Sync {
    fn after_fire(&self, graph: &mut StreamGraph<T>, worker: WorkerId) -> Result<()>;
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFiringDelegate;

impl<T> FiringDelegate<T> for DefaultFiringDelegate {
    fn after_fire(&self, _graph: &mut StreamGraph<T>, _worker: WorkerId) -> Result<()> {
        Ok(())
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::channel::Element;
use crate::core::error::Result;
use crate::core::graph::{PortShape, Work, WorkContext, WorkerRates};
use crate::core::rate::Rate;

/// Passes each element through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T: Element> Work<T> for Identity {
    fn rates(&self, _shape: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, T>) -> Result<()> {
        let element = ctx.pop()?;
        ctx.push(element)
    }
}

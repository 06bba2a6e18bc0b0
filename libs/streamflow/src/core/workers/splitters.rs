// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::channel::Element;
use crate::core::error::Result;
use crate::core::graph::{PortShape, Work, WorkContext, WorkerRates};
use crate::core::rate::Rate;

/// Copies each input element to every output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateSplitter;

impl<T: Element> Work<T> for DuplicateSplitter {
    fn rates(&self, shape: PortShape) -> WorkerRates {
        WorkerRates::new(
            vec![Rate::exact(0)],
            vec![Rate::exact(1)],
            vec![Rate::exact(1); shape.outputs],
        )
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, T>) -> Result<()> {
        let element = ctx.pop()?;
        for output in 0..ctx.output_count() {
            ctx.push_to(output, element.clone())?;
        }
        Ok(())
    }
}

/// Deals `weight` consecutive elements to each output in turn.
#[derive(Debug, Clone, Copy)]
pub struct RoundrobinSplitter {
    weight: usize,
}

impl RoundrobinSplitter {
    pub fn new() -> Self {
        Self::with_weight(1)
    }

    pub fn with_weight(weight: usize) -> Self {
        Self { weight }
    }
}

impl Default for RoundrobinSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Work<T> for RoundrobinSplitter {
    fn rates(&self, shape: PortShape) -> WorkerRates {
        WorkerRates::new(
            vec![Rate::exact(0)],
            vec![Rate::exact(self.weight * shape.outputs)],
            vec![Rate::exact(self.weight); shape.outputs],
        )
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, T>) -> Result<()> {
        for output in 0..ctx.output_count() {
            for _ in 0..self.weight {
                let element = ctx.pop()?;
                ctx.push_to(output, element)?;
            }
        }
        Ok(())
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::channel::Element;
use crate::core::error::Result;
use crate::core::graph::{PortShape, Work, WorkContext, WorkerRates};
use crate::core::rate::Rate;

/// Collects `weight` consecutive elements from each input in turn.
#[derive(Debug, Clone, Copy)]
pub struct RoundrobinJoiner {
    weight: usize,
}

impl RoundrobinJoiner {
    pub fn new() -> Self {
        Self::with_weight(1)
    }

    pub fn with_weight(weight: usize) -> Self {
        Self { weight }
    }
}

impl Default for RoundrobinJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Work<T> for RoundrobinJoiner {
    fn rates(&self, shape: PortShape) -> WorkerRates {
        WorkerRates::new(
            vec![Rate::exact(0); shape.inputs],
            vec![Rate::exact(self.weight); shape.inputs],
            vec![Rate::exact(self.weight * shape.inputs)],
        )
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, T>) -> Result<()> {
        for input in 0..ctx.input_count() {
            for _ in 0..self.weight {
                let element = ctx.pop_from(input)?;
                ctx.push(element)?;
            }
        }
        Ok(())
    }
}

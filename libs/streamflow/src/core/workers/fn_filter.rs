// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;

use crate::core::error::Result;
use crate::core::graph::{PortShape, Work, WorkContext, WorkerRates};
use crate::core::rate::Rate;

/// A filter whose work routine is a closure.
///
/// ```ignore
/// let doubler = FnFilter::new(Rate::exact(1), Rate::exact(1), |ctx: &mut WorkContext<'_, i32>| {
///     let x = ctx.pop()?;
///     ctx.push(x * 2)
/// });
/// ```
pub struct FnFilter<F> {
    peek: Rate,
    pop: Rate,
    push: Rate,
    work: F,
}

impl<F> FnFilter<F> {
    /// Filter that does not peek past what it pops.
    pub fn new<T>(pop: Rate, push: Rate, work: F) -> Self
    where
        F: FnMut(&mut WorkContext<'_, T>) -> Result<()>,
    {
        Self {
            peek: Rate::exact(0),
            pop,
            push,
            work,
        }
    }

    pub fn with_peek(mut self, peek: Rate) -> Self {
        self.peek = peek;
        self
    }
}

impl<T, F> Work<T> for FnFilter<F>
where
    T: 'static,
    F: FnMut(&mut WorkContext<'_, T>) -> Result<()> + Send + 'static,
{
    fn rates(&self, _shape: PortShape) -> WorkerRates {
        WorkerRates::filter(self.peek, self.pop, self.push)
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, T>) -> Result<()> {
        (self.work)(ctx)
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter")
            .field("peek", &self.peek)
            .field("pop", &self.pop)
            .field("push", &self.push)
            .finish_non_exhaustive()
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Work bodies and helpers shared by the integration tests.

#![allow(dead_code)]

use streamflow::prelude::*;
use streamflow::{BoundaryToken, Channel};

/// Multiplies each element by a factor.
pub struct Multiplier(pub i64);

impl Work<i64> for Multiplier {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let x = ctx.pop()?;
        ctx.push(x * self.0)
    }
}

/// Pops two, pushes their sum.
pub struct PairwiseSum;

impl Work<i64> for PairwiseSum {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(2), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let a = ctx.pop()?;
        let b = ctx.pop()?;
        ctx.push(a + b)
    }
}

/// Sliding-window sum: peeks `window` elements, pops one.
pub struct PeekingAdder {
    pub window: usize,
}

impl Work<i64> for PeekingAdder {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(self.window), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let mut sum = 0;
        for index in 0..self.window {
            sum += ctx.peek(index)?;
        }
        ctx.pop()?;
        ctx.push(sum)
    }
}

/// Pops one, pushes it `copies` times.
pub struct Batcher {
    pub copies: usize,
}

impl Work<i64> for Batcher {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(self.copies))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let x = ctx.pop()?;
        for _ in 0..self.copies {
            ctx.push(x)?;
        }
        Ok(())
    }
}

/// Passes elements through, pushing the current tag instead of the element
/// and remembering the tag seen at each firing. Messages change the tag.
#[derive(Default)]
pub struct Tagger {
    pub tag: i64,
    pub seen: Vec<i64>,
}

impl Tagger {
    pub fn set_tag(&mut self, tag: i64) {
        self.tag = tag;
    }
}

impl Work<i64> for Tagger {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        ctx.pop()?;
        self.seen.push(self.tag);
        ctx.push(self.tag)
    }
}

/// Identity that sends `value_for(executions)` through its portal on the
/// firings selected by `send_on`.
pub struct Announcer {
    pub portal: Portal<Tagger>,
    pub send_on: fn(u64) -> bool,
    pub value_for: fn(u64) -> i64,
}

impl Work<i64> for Announcer {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let x = ctx.pop()?;
        let executions = ctx.executions();
        if (self.send_on)(executions) {
            let value = (self.value_for)(executions);
            ctx.send(&self.portal, move |tagger: &mut Tagger| tagger.set_tag(value));
        }
        ctx.push(x)
    }
}

/// Declares one push per firing but pushes twice.
pub struct OverPusher;

impl Work<i64> for OverPusher {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let x = ctx.pop()?;
        ctx.push(x)?;
        ctx.push(x)
    }
}

/// Declares a peek window of 2 but looks three elements ahead.
pub struct OverPeeker;

impl Work<i64> for OverPeeker {
    fn rates(&self, _: PortShape) -> WorkerRates {
        WorkerRates::filter(Rate::exact(2), Rate::exact(1), Rate::exact(1))
    }

    fn work(&mut self, ctx: &mut WorkContext<'_, i64>) -> Result<()> {
        let ahead = ctx.peek(2).unwrap_or_default();
        ctx.pop()?;
        ctx.push(ahead)
    }
}

pub fn push_all(interpreter: &mut Interpreter<i64>, token: BoundaryToken, values: &[i64]) {
    let channel: &mut dyn Channel<i64> = interpreter.channel_mut(token).unwrap();
    for &value in values {
        channel.push(value);
    }
}

pub fn pop_all(interpreter: &mut Interpreter<i64>, token: BoundaryToken) -> Vec<i64> {
    let channel = interpreter.channel_mut(token).unwrap();
    std::iter::from_fn(|| channel.pop().ok()).collect()
}

/// The only input and output boundary of a whole-graph interpreter.
pub fn endpoints(interpreter: &Interpreter<i64>) -> (BoundaryToken, BoundaryToken) {
    let input = interpreter.input_tokens().next().unwrap();
    let output = interpreter.output_tokens().next().unwrap();
    (input, output)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

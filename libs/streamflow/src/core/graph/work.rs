// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::any::Any;
use std::sync::Arc;

use super::ids::{ChannelId, WorkerId};
use super::worker::{Port, PortShape, WorkerRates};
use crate::core::channel::Channel;
use crate::core::error::{Result, StreamError};
use crate::core::messages::{MessageAction, OutgoingMessage, Portal};

/// Downcasting support for work bodies, so messages can reach the concrete
/// type behind a `Box<dyn Work<T>>`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<W: Any> AsAny for W {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The body of a worker.
///
/// `rates` is queried once when the graph is built, with the worker's final
/// port counts. `work` is one firing: it must consume and produce exactly what
/// the declared rates promise whenever the inputs hold at least
/// `max(peek.max, pop.max)` elements.
pub trait Work<T>: AsAny + Send {
    fn rates(&self, shape: PortShape) -> WorkerRates;

    fn work(&mut self, ctx: &mut WorkContext<'_, T>) -> Result<()>;
}

/// Channel access and message sending for a single firing.
pub struct WorkContext<'a, T> {
    worker: WorkerId,
    executions: u64,
    inputs: &'a [Port],
    outputs: &'a [Port],
    channels: &'a mut [Box<dyn Channel<T>>],
    outbox: Vec<OutgoingMessage>,
}

impl<'a, T: 'static> WorkContext<'a, T> {
    pub(crate) fn new(
        worker: WorkerId,
        executions: u64,
        inputs: &'a [Port],
        outputs: &'a [Port],
        channels: &'a mut [Box<dyn Channel<T>>],
    ) -> Self {
        Self {
            worker,
            executions,
            inputs,
            outputs,
            channels,
            outbox: Vec::new(),
        }
    }

    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Completed firings before this one.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn pop(&mut self) -> Result<T> {
        self.pop_from(0)
    }

    pub fn pop_from(&mut self, input: usize) -> Result<T> {
        let channel = self.input_channel(input)?;
        self.channels[channel.index()].pop()
    }

    pub fn peek(&self, index: usize) -> Result<T> {
        self.peek_at(0, index)
    }

    pub fn peek_at(&self, input: usize, index: usize) -> Result<T> {
        let channel = self.input_channel(input)?;
        self.channels[channel.index()].peek(index)
    }

    /// Elements currently buffered on an input.
    pub fn available(&self, input: usize) -> Result<usize> {
        let channel = self.input_channel(input)?;
        Ok(self.channels[channel.index()].size())
    }

    pub fn push(&mut self, element: T) -> Result<()> {
        self.push_to(0, element)
    }

    pub fn push_to(&mut self, output: usize, element: T) -> Result<()> {
        let channel = self
            .outputs
            .get(output)
            .map(|port| port.channel)
            .ok_or_else(|| {
                StreamError::InvalidGraph(format!("{} has no output {}", self.worker, output))
            })?;
        self.channels[channel.index()].push(element);
        Ok(())
    }

    /// Queue a message to every recipient registered on `portal`. Delivery
    /// times are computed from this firing's execution count once `work`
    /// returns.
    pub fn send<R, F>(&mut self, portal: &Portal<R>, message: F)
    where
        R: 'static,
        F: Fn(&mut R) + Send + Sync + 'static,
    {
        let action: MessageAction = Arc::new(move |body: &mut dyn Any| {
            let recipient = body.downcast_mut::<R>().ok_or_else(|| {
                StreamError::MessageDelivery(format!(
                    "recipient is not a {}",
                    std::any::type_name::<R>()
                ))
            })?;
            message(recipient);
            Ok(())
        });
        self.outbox.push(OutgoingMessage {
            portal: portal.id(),
            action,
        });
    }

    pub(crate) fn into_outbox(self) -> Vec<OutgoingMessage> {
        self.outbox
    }

    fn input_channel(&self, input: usize) -> Result<ChannelId> {
        self.inputs
            .get(input)
            .map(|port| port.channel)
            .ok_or_else(|| StreamError::InvalidGraph(format!("{} has no input {}", self.worker, input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::ArrayChannel;

    fn two_channels() -> Vec<Box<dyn Channel<i32>>> {
        vec![
            Box::new(ArrayChannel::from_iter([1, 2, 3])),
            Box::new(ArrayChannel::new()),
        ]
    }

    #[test]
    fn test_context_routes_by_port() {
        let mut channels = two_channels();
        let inputs = [Port {
            peer: None,
            channel: ChannelId::new(0),
        }];
        let outputs = [Port {
            peer: None,
            channel: ChannelId::new(1),
        }];
        let mut ctx = WorkContext::new(WorkerId::new(0), 4, &inputs, &outputs, &mut channels);

        assert_eq!(ctx.executions(), 4);
        assert_eq!(ctx.peek(2).unwrap(), 3);
        assert_eq!(ctx.available(0).unwrap(), 3);
        let first = ctx.pop().unwrap();
        ctx.push(first * 10).unwrap();
        drop(ctx);

        assert_eq!(channels[0].size(), 2);
        assert_eq!(channels[1].pop().unwrap(), 10);
    }

    #[test]
    fn test_missing_port_is_an_error() {
        let mut channels = two_channels();
        let mut ctx = WorkContext::new(WorkerId::new(3), 0, &[], &[], &mut channels);

        assert!(matches!(ctx.pop(), Err(StreamError::InvalidGraph(_))));
        let err = ctx.push_to(1, 7).unwrap_err();
        assert_eq!(err.to_string(), "Invalid stream graph: w3 has no output 1");
    }

    #[test]
    fn test_as_any_downcasts_to_concrete_body() {
        struct Counter(u32);
        let mut body = Counter(1);
        let any: &mut dyn Any = body.as_any_mut();
        any.downcast_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(body.0, 2);
    }
}

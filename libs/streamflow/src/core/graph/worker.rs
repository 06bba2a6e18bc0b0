// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{ChannelId, WorkerId};
use super::work::Work;
use crate::core::error::{Result, StreamError};
use crate::core::messages::{Message, MessageQueue};
use crate::core::rate::Rate;

/// Structural role of a worker, which fixes its port arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    /// One input, one output.
    Filter,
    /// One input, one or more outputs.
    Splitter,
    /// One or more inputs, one output.
    Joiner,
}

impl WorkerKind {
    pub(crate) fn accepts_more_inputs(self, current: usize) -> bool {
        match self {
            WorkerKind::Filter | WorkerKind::Splitter => current == 0,
            WorkerKind::Joiner => true,
        }
    }

    pub(crate) fn accepts_more_outputs(self, current: usize) -> bool {
        match self {
            WorkerKind::Filter | WorkerKind::Joiner => current == 0,
            WorkerKind::Splitter => true,
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Filter => write!(f, "filter"),
            WorkerKind::Splitter => write!(f, "splitter"),
            WorkerKind::Joiner => write!(f, "joiner"),
        }
    }
}

/// One end of a channel as seen from a worker. `peer` is the worker on the
/// other end, or `None` for a boundary channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub peer: Option<WorkerId>,
    pub channel: ChannelId,
}

/// Final port counts handed to [`Work::rates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortShape {
    pub inputs: usize,
    pub outputs: usize,
}

/// Declared rates of a worker, index-aligned with its ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRates {
    pub peek: Vec<Rate>,
    pub pop: Vec<Rate>,
    pub push: Vec<Rate>,
}

impl WorkerRates {
    pub fn new(peek: Vec<Rate>, pop: Vec<Rate>, push: Vec<Rate>) -> Self {
        Self { peek, pop, push }
    }

    /// Rates of a single-input single-output worker.
    pub fn filter(peek: Rate, pop: Rate, push: Rate) -> Self {
        Self::new(vec![peek], vec![pop], vec![push])
    }

    pub(crate) fn check_shape(&self, worker: &str, shape: PortShape) -> Result<()> {
        if self.peek.len() != shape.inputs
            || self.pop.len() != shape.inputs
            || self.push.len() != shape.outputs
        {
            return Err(StreamError::InvalidGraph(format!(
                "{} declares {} peek, {} pop and {} push rates for {} inputs and {} outputs",
                worker,
                self.peek.len(),
                self.pop.len(),
                self.push.len(),
                shape.inputs,
                shape.outputs
            )));
        }
        Ok(())
    }
}

/// A node of the stream graph: a work body plus its ports, rates, execution
/// count and pending messages.
pub struct Worker<T> {
    pub(crate) id: WorkerId,
    pub(crate) name: String,
    pub(crate) kind: WorkerKind,
    pub(crate) inputs: Vec<Port>,
    pub(crate) outputs: Vec<Port>,
    pub(crate) rates: WorkerRates,
    pub(crate) executions: u64,
    pub(crate) messages: MessageQueue,
    pub(crate) body: Box<dyn Work<T>>,
}

impl<T: 'static> Worker<T> {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    /// Completed firings.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Upstream peers, index-aligned with the inputs.
    pub fn predecessors(&self) -> impl Iterator<Item = Option<WorkerId>> + '_ {
        self.inputs.iter().map(|port| port.peer)
    }

    /// Downstream peers, index-aligned with the outputs.
    pub fn successors(&self) -> impl Iterator<Item = Option<WorkerId>> + '_ {
        self.outputs.iter().map(|port| port.peer)
    }

    pub fn input_channels(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.inputs.iter().map(|port| port.channel)
    }

    pub fn output_channels(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.outputs.iter().map(|port| port.channel)
    }

    pub fn rates(&self) -> &WorkerRates {
        &self.rates
    }

    pub fn get_peek_rates(&self) -> &[Rate] {
        &self.rates.peek
    }

    pub fn get_pop_rates(&self) -> &[Rate] {
        &self.rates.pop
    }

    pub fn get_push_rates(&self) -> &[Rate] {
        &self.rates.push
    }

    pub fn pending_messages(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    /// Concrete body, if it is an `R`.
    pub fn body<R: 'static>(&self) -> Option<&R> {
        let body: &dyn Work<T> = &*self.body;
        body.as_any().downcast_ref::<R>()
    }

    pub fn body_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.body_any_mut().downcast_mut::<R>()
    }

    /// Queue a message. Its delivery time must still be ahead: strictly
    /// greater than the completed executions.
    pub fn send_message(&mut self, message: Message) -> Result<()> {
        if message.delivery_time() <= self.executions {
            return Err(StreamError::MissedMessage {
                worker: self.label(),
                executions: self.executions,
                delivery_time: message.delivery_time(),
            });
        }
        tracing::trace!(
            "{}: queued message for delivery at {}",
            self.label(),
            message.delivery_time()
        );
        self.messages.insert(message);
        Ok(())
    }

    /// Deliver every message due before the upcoming firing.
    pub(crate) fn deliver_due_messages(&mut self) -> Result<()> {
        let upcoming = self.executions + 1;
        while let Some(delivery_time) = self.messages.front_delivery_time() {
            if delivery_time > upcoming {
                break;
            }
            if delivery_time < upcoming {
                return Err(StreamError::MissedMessage {
                    worker: self.label(),
                    executions: self.executions,
                    delivery_time,
                });
            }
            if let Some(message) = self.messages.pop_front() {
                tracing::trace!("{}: delivering message at {}", self.label(), delivery_time);
                message.deliver(self.body_any_mut())?;
            }
        }
        Ok(())
    }

    /// `name (wN)`, used in logs and errors.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    fn body_any_mut(&mut self) -> &mut dyn Any {
        let body: &mut dyn Work<T> = &mut *self.body;
        body.as_any_mut()
    }
}

impl<T> fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("executions", &self.executions)
            .field("pending_messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}

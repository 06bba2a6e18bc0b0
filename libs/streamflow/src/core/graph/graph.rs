// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::{BTreeSet, VecDeque};

use petgraph::Direction;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::ids::{ChannelId, WorkerId};
use super::work::WorkContext;
use super::worker::{Port, Worker, WorkerKind, WorkerRates};
use crate::core::channel::{Channel, ChannelStats};
use crate::core::error::{Result, StreamError};
use crate::core::messages::{Message, MessageConstraint, OutgoingMessage, PortalId};

/// The built stream graph: an arena of workers and channels, the declared
/// message constraints, and a petgraph mirror of the worker topology for
/// structural queries.
pub struct StreamGraph<T> {
    pub(crate) workers: Vec<Worker<T>>,
    pub(crate) channels: Vec<Box<dyn Channel<T>>>,
    pub(crate) constraints: Vec<MessageConstraint>,
    pub(crate) portal_recipients: Vec<Vec<WorkerId>>,
    pub(crate) topology: DiGraph<WorkerId, ChannelId>,
}

impl<T: 'static> StreamGraph<T> {
    pub fn worker(&self, id: WorkerId) -> Option<&Worker<T>> {
        self.workers.get(id.index())
    }

    pub fn worker_mut(&mut self, id: WorkerId) -> Option<&mut Worker<T>> {
        self.workers.get_mut(id.index())
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker<T>> {
        self.workers.iter()
    }

    pub fn worker_ids(&self) -> impl Iterator<Item = WorkerId> + '_ {
        self.workers.iter().map(|worker| worker.id)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn contains_worker(&self, id: WorkerId) -> bool {
        id.index() < self.workers.len()
    }

    /// Find a worker by name. Names are not required to be unique; the
    /// lowest id wins.
    pub fn find_worker(&self, name: &str) -> Option<WorkerId> {
        self.workers
            .iter()
            .find(|worker| worker.name == name)
            .map(|worker| worker.id)
    }

    pub fn channel(&self, id: ChannelId) -> Option<&dyn Channel<T>> {
        self.channels.get(id.index()).map(|channel| channel.as_ref())
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut dyn Channel<T>> {
        match self.channels.get_mut(id.index()) {
            Some(channel) => Some(channel.as_mut()),
            None => None,
        }
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        (0..self.channels.len()).map(ChannelId::new)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_stats(&self, id: ChannelId) -> Option<ChannelStats> {
        self.channels.get(id.index()).and_then(|channel| channel.stats())
    }

    pub fn reset_channel_stats(&mut self, id: ChannelId) {
        if let Some(channel) = self.channels.get_mut(id.index()) {
            channel.reset_stats();
        }
    }

    pub fn executions(&self, id: WorkerId) -> Option<u64> {
        self.worker(id).map(Worker::executions)
    }

    /// Upstream peers of `id`, index-aligned with its inputs.
    pub fn predecessors(&self, id: WorkerId) -> Vec<Option<WorkerId>> {
        self.worker(id)
            .map(|worker| worker.predecessors().collect())
            .unwrap_or_default()
    }

    /// Downstream peers of `id`, index-aligned with its outputs.
    pub fn successors(&self, id: WorkerId) -> Vec<Option<WorkerId>> {
        self.worker(id)
            .map(|worker| worker.successors().collect())
            .unwrap_or_default()
    }

    pub fn input_channels(&self, id: WorkerId) -> Vec<ChannelId> {
        self.worker(id)
            .map(|worker| worker.input_channels().collect())
            .unwrap_or_default()
    }

    pub fn output_channels(&self, id: WorkerId) -> Vec<ChannelId> {
        self.worker(id)
            .map(|worker| worker.output_channels().collect())
            .unwrap_or_default()
    }

    pub fn constraints(&self) -> &[MessageConstraint] {
        &self.constraints
    }

    /// Workers registered on a portal.
    pub fn recipients(&self, portal: PortalId) -> &[WorkerId] {
        self.portal_recipients
            .get(portal.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Messages queued across all workers.
    pub fn pending_messages(&self) -> usize {
        self.workers.iter().map(Worker::pending_messages).sum()
    }

    /// Workers connected to `root`, following channels in either direction.
    pub fn reachable_from(&self, root: WorkerId) -> BTreeSet<WorkerId> {
        let mut visited = BTreeSet::new();
        if !self.contains_worker(root) {
            return visited;
        }

        let mut queue = VecDeque::from([root]);
        visited.insert(root);
        while let Some(id) = queue.pop_front() {
            for neighbor in self.topology.neighbors_undirected(node_index(id)) {
                let neighbor = self.topology[neighbor];
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        visited
    }

    /// Workers with no in-graph downstream peer.
    pub fn find_sinks(&self) -> Vec<WorkerId> {
        self.externals(Direction::Outgoing)
    }

    /// Workers with no in-graph upstream peer.
    pub fn find_sources(&self) -> Vec<WorkerId> {
        self.externals(Direction::Incoming)
    }

    fn externals(&self, direction: Direction) -> Vec<WorkerId> {
        let mut ids: Vec<WorkerId> = self
            .topology
            .externals(direction)
            .map(|node| self.topology[node])
            .collect();
        ids.sort();
        ids
    }

    /// Serializable description of the graph structure.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            workers: self
                .workers
                .iter()
                .map(|worker| WorkerSummary {
                    id: worker.id,
                    name: worker.name.clone(),
                    kind: worker.kind,
                    inputs: worker.inputs.clone(),
                    outputs: worker.outputs.clone(),
                    rates: worker.rates.clone(),
                    executions: worker.executions,
                    pending_messages: worker.pending_messages(),
                })
                .collect(),
            channels: self
                .channels
                .iter()
                .enumerate()
                .map(|(index, channel)| ChannelSummary {
                    id: ChannelId::new(index),
                    size: channel.size(),
                })
                .collect(),
            constraints: self
                .constraints
                .iter()
                .map(|constraint| ConstraintSummary {
                    sender: constraint.sender(),
                    recipient: constraint.recipient(),
                    portal: constraint.portal(),
                    schedule: format!("{:?}", constraint.schedule()),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.summary()).map_err(|e| StreamError::Other(e.into()))
    }

    /// Graphviz rendering of the worker topology.
    pub fn to_dot(&self) -> String {
        let labelled = self.topology.map(
            |_, id| self.workers[id.index()].label(),
            |_, channel| channel.to_string(),
        );
        format!("{}", Dot::new(&labelled))
    }

    /// Fire one worker: deliver due messages, run its body once, advance its
    /// execution count and route any messages it sent.
    pub(crate) fn fire(&mut self, id: WorkerId) -> Result<()> {
        let worker = &mut self.workers[id.index()];
        worker.deliver_due_messages()?;

        let executions = worker.executions;
        let outbox = {
            let Worker {
                inputs,
                outputs,
                body,
                ..
            } = worker;
            let mut ctx = WorkContext::new(id, executions, inputs, outputs, &mut self.channels);
            body.work(&mut ctx)?;
            ctx.into_outbox()
        };
        worker.executions += 1;
        tracing::trace!("{}: fired, executions {}", worker.label(), worker.executions);

        self.route_messages(id, executions, outbox)
    }

    fn route_messages(
        &mut self,
        sender: WorkerId,
        sender_executions: u64,
        outbox: Vec<OutgoingMessage>,
    ) -> Result<()> {
        for outgoing in outbox {
            let recipients = self
                .portal_recipients
                .get(outgoing.portal.index())
                .ok_or_else(|| {
                    StreamError::MessageDelivery(format!("unknown portal {}", outgoing.portal))
                })?;
            for &recipient in recipients {
                let constraint = self
                    .constraints
                    .iter()
                    .find(|c| {
                        c.sender() == sender
                            && c.recipient() == recipient
                            && c.portal() == outgoing.portal
                    })
                    .ok_or_else(|| {
                        StreamError::MalformedConstraint(format!(
                            "no constraint from {} to {} via {}",
                            sender, recipient, outgoing.portal
                        ))
                    })?;
                let delivery_time = constraint.delivery_time(sender_executions);
                let message = Message::new(outgoing.portal, delivery_time, outgoing.action.clone());
                self.workers[recipient.index()].send_message(message)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn node_index(id: WorkerId) -> NodeIndex {
    NodeIndex::new(id.index())
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub workers: Vec<WorkerSummary>,
    pub channels: Vec<ChannelSummary>,
    pub constraints: Vec<ConstraintSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub id: WorkerId,
    pub name: String,
    pub kind: WorkerKind,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub rates: WorkerRates,
    pub executions: u64,
    pub pending_messages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstraintSummary {
    pub sender: WorkerId,
    pub recipient: WorkerId,
    pub portal: PortalId,
    pub schedule: String,
}

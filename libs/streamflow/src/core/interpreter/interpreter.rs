// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::boundary::{BoundaryChannel, BoundaryToken};
use super::delegate::{DefaultFiringDelegate, FiringDelegate};
use super::stats::InterpreterStats;
use crate::core::channel::{Channel, Element};
use crate::core::error::{Result, StreamError};
use crate::core::graph::{StreamGraph, WorkerId};
use crate::core::messages::MessageConstraint;

/// Demand-driven scheduler for a fixed section of a stream graph.
///
/// The section's sinks (workers with no successor inside the section) are
/// pulled repeatedly until a full pass fires none of them. Pulling a worker
/// fires exactly the upstream workers it needs: producers of its starved
/// inputs, and senders of messages that would otherwise arrive after its next
/// firing.
///
/// Channels crossing the section boundary are exposed through
/// [`BoundaryToken`]s. Callers push into input boundaries and pop from output
/// boundaries around calls to [`interpret`](Self::interpret).
pub struct Interpreter<T> {
    graph: StreamGraph<T>,
    workers: BTreeSet<WorkerId>,
    sinks: Vec<WorkerId>,
    io_channels: BTreeMap<BoundaryToken, BoundaryChannel>,
    constraints_for_recipient: HashMap<WorkerId, Vec<MessageConstraint>>,
    delegate: Arc<dyn FiringDelegate<T>>,
    max_passes: Option<usize>,
    stats: InterpreterStats,
}

impl<T: Element> Interpreter<T> {
    /// Interpreter over every worker and constraint of `graph`.
    pub fn for_graph(graph: StreamGraph<T>) -> Result<Self> {
        let workers: Vec<WorkerId> = graph.worker_ids().collect();
        let constraints = graph.constraints().to_vec();
        Self::new(graph, workers, constraints)
    }

    /// Interpreter over the section `workers` of `graph`.
    ///
    /// `constraints` must be declared on `graph`, and must include every
    /// graph constraint whose sender is in the section. A constraint with one
    /// endpoint inside the section and one outside is rejected.
    pub fn new(
        graph: StreamGraph<T>,
        workers: impl IntoIterator<Item = WorkerId>,
        constraints: impl IntoIterator<Item = MessageConstraint>,
    ) -> Result<Self> {
        let workers: BTreeSet<WorkerId> = workers.into_iter().collect();
        if let Some(unknown) = workers.iter().find(|&&id| !graph.contains_worker(id)) {
            return Err(StreamError::InvalidGraph(format!(
                "section names unknown worker {}",
                unknown
            )));
        }

        let predecessors: BTreeSet<WorkerId> = workers
            .iter()
            .flat_map(|&id| graph.predecessors(id))
            .flatten()
            .collect();
        let sinks: Vec<WorkerId> = workers.difference(&predecessors).copied().collect();

        let constraints: Vec<MessageConstraint> = constraints.into_iter().collect();
        for constraint in &constraints {
            if !graph.contains_worker(constraint.sender())
                || !graph.contains_worker(constraint.recipient())
            {
                return Err(StreamError::MalformedConstraint(format!(
                    "constraint names unknown worker: {}",
                    constraint
                )));
            }
            if !graph.constraints().iter().any(|c| c.same_route(constraint)) {
                return Err(StreamError::MalformedConstraint(format!(
                    "constraint is not declared on the graph: {}",
                    constraint
                )));
            }
        }
        // Routing follows the graph's constraints, so every one touching the
        // section must stay inside it and be scheduled here.
        for declared in graph.constraints() {
            let sender_inside = workers.contains(&declared.sender());
            let recipient_inside = workers.contains(&declared.recipient());
            if sender_inside != recipient_inside {
                return Err(StreamError::MalformedConstraint(format!(
                    "constraint crosses interpreter boundary: {}",
                    declared
                )));
            }
            if sender_inside && !constraints.iter().any(|c| c.same_route(declared)) {
                return Err(StreamError::MalformedConstraint(format!(
                    "section omits constraint {}",
                    declared
                )));
            }
        }

        let mut constraints_for_recipient: HashMap<WorkerId, Vec<MessageConstraint>> =
            HashMap::new();
        for constraint in constraints {
            if workers.contains(&constraint.recipient()) {
                constraints_for_recipient
                    .entry(constraint.recipient())
                    .or_default()
                    .push(constraint);
            }
        }

        let mut io_channels = BTreeMap::new();
        for &id in &workers {
            let Some(worker) = graph.worker(id) else {
                continue;
            };
            for port in worker.inputs() {
                if !port.peer.is_some_and(|peer| workers.contains(&peer)) {
                    let token = BoundaryToken::new(io_channels.len());
                    io_channels.insert(token, BoundaryChannel::input(port.channel, port.peer, id));
                }
            }
            for port in worker.outputs() {
                if !port.peer.is_some_and(|peer| workers.contains(&peer)) {
                    let token = BoundaryToken::new(io_channels.len());
                    io_channels.insert(token, BoundaryChannel::output(port.channel, id, port.peer));
                }
            }
        }

        tracing::debug!(
            "Interpreter section: {} workers, sinks {:?}, {} boundary channels",
            workers.len(),
            sinks,
            io_channels.len()
        );

        Ok(Self {
            graph,
            workers,
            sinks,
            io_channels,
            constraints_for_recipient,
            delegate: Arc::new(DefaultFiringDelegate),
            max_passes: None,
            stats: InterpreterStats::default(),
        })
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn FiringDelegate<T>>) -> Self {
        self.delegate = delegate;
        self
    }

    /// Stop `interpret` after this many passes even if sinks can still fire.
    /// Guards sections containing sources that need no input.
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Pull every sink until a full pass fires none. Returns whether any sink
    /// fired during this call.
    pub fn interpret(&mut self) -> Result<bool> {
        self.stats.interpret_calls += 1;
        let mut ever_fired = false;
        let mut passes = 0usize;
        loop {
            if self.max_passes.is_some_and(|limit| passes >= limit) {
                tracing::debug!("Stopping after {} passes", passes);
                break;
            }
            passes += 1;
            self.stats.passes += 1;

            let mut fired = false;
            for index in 0..self.sinks.len() {
                let sink = self.sinks[index];
                fired |= self.pull(sink)?;
            }
            ever_fired |= fired;
            if !fired {
                break;
            }
        }
        tracing::trace!("interpret: {} passes, progress {}", passes, ever_fired);
        Ok(ever_fired)
    }

    /// Fire `worker` once, first firing whatever it depends on. Returns false
    /// if some dependency needs data from outside the section.
    fn pull(&mut self, worker: WorkerId) -> Result<bool> {
        self.stats.pulls += 1;
        let mut stack = vec![worker];

        while let Some(&current) = stack.last() {
            if stack[..stack.len() - 1].contains(&current) {
                let label = self.label(current);
                tracing::error!("Unsatisfiable message constraints at {}", label);
                return Err(StreamError::UnsatisfiableConstraints { worker: label });
            }

            if let Some(channel) = self.index_of_unsatisfied_channel(current)? {
                let upstream = self
                    .graph
                    .worker(current)
                    .and_then(|w| w.inputs().get(channel))
                    .and_then(|port| port.peer)
                    .filter(|peer| self.workers.contains(peer));
                match upstream {
                    Some(upstream) => {
                        stack.push(upstream);
                        continue;
                    }
                    None => {
                        self.stats.stalled_pulls += 1;
                        tracing::trace!(
                            "{} starved on input {} from outside the section",
                            self.label(current),
                            channel
                        );
                        return Ok(false);
                    }
                }
            }

            if let Some(sender) = self.due_sender(current) {
                stack.push(sender);
                continue;
            }

            self.graph.fire(current)?;
            self.stats.firings += 1;
            self.delegate.after_fire(&mut self.graph, current)?;
            stack.pop();
        }

        Ok(true)
    }

    /// Lowest-index input holding fewer than `max(peek.max, pop.max)`
    /// elements, if any.
    fn index_of_unsatisfied_channel(&self, id: WorkerId) -> Result<Option<usize>> {
        let Some(worker) = self.graph.worker(id) else {
            return Err(StreamError::InvalidGraph(format!("unknown worker {}", id)));
        };
        let rates = worker
            .get_peek_rates()
            .iter()
            .zip(worker.get_pop_rates());
        for (index, (port, (peek, pop))) in worker.inputs().iter().zip(rates).enumerate() {
            let (Some(peek_max), Some(pop_max)) = (peek.max().known(), pop.max().known()) else {
                return Err(StreamError::UnsupportedRate {
                    worker: worker.label(),
                    channel: index,
                    peek: *peek,
                    pop: *pop,
                });
            };
            let required = peek_max.max(pop_max);
            let available = self.graph.channel(port.channel).map_or(0, |c| c.size());
            if available < required {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// A sender that must fire before `recipient` does, because a message it
    /// sends on its next firing would be due at or before the recipient's
    /// next firing.
    ///
    /// The deadline is compared with the recipient's upcoming firing number,
    /// since that is the firing the message would have to precede.
    fn due_sender(&self, recipient: WorkerId) -> Option<WorkerId> {
        let constraints = self.constraints_for_recipient.get(&recipient)?;
        let next_firing = self.graph.executions(recipient)? + 1;
        constraints
            .iter()
            .find(|constraint| {
                self.graph
                    .executions(constraint.sender())
                    .is_some_and(|sent| constraint.delivery_time(sent) <= next_firing)
            })
            .map(MessageConstraint::sender)
    }

    fn label(&self, id: WorkerId) -> String {
        self.graph
            .worker(id)
            .map_or_else(|| id.to_string(), |worker| worker.label())
    }

    /// Workers owned by this interpreter.
    pub fn workers(&self) -> &BTreeSet<WorkerId> {
        &self.workers
    }

    pub fn sinks(&self) -> &[WorkerId] {
        &self.sinks
    }

    /// Boundary channels of the section.
    pub fn channels(&self) -> &BTreeMap<BoundaryToken, BoundaryChannel> {
        &self.io_channels
    }

    pub fn boundary(&self, token: BoundaryToken) -> Option<&BoundaryChannel> {
        self.io_channels.get(&token)
    }

    pub fn input_tokens(&self) -> impl Iterator<Item = BoundaryToken> + '_ {
        self.io_channels
            .iter()
            .filter(|(_, boundary)| boundary.is_input())
            .map(|(&token, _)| token)
    }

    pub fn output_tokens(&self) -> impl Iterator<Item = BoundaryToken> + '_ {
        self.io_channels
            .iter()
            .filter(|(_, boundary)| boundary.is_output())
            .map(|(&token, _)| token)
    }

    pub fn channel(&self, token: BoundaryToken) -> Option<&dyn Channel<T>> {
        let boundary = self.io_channels.get(&token)?;
        self.graph.channel(boundary.channel())
    }

    pub fn channel_mut(&mut self, token: BoundaryToken) -> Option<&mut dyn Channel<T>> {
        let boundary = self.io_channels.get(&token)?;
        self.graph.channel_mut(boundary.channel())
    }

    pub fn graph(&self) -> &StreamGraph<T> {
        &self.graph
    }

    pub fn into_graph(self) -> StreamGraph<T> {
        self.graph
    }

    pub fn stats(&self) -> InterpreterStats {
        self.stats
    }
}

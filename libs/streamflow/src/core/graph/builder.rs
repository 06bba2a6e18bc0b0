// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::any::TypeId;
use std::sync::Arc;

use petgraph::graph::DiGraph;

use super::element::{StreamElement, WorkerSpec};
use super::graph::{StreamGraph, node_index};
use super::ids::{ChannelId, WorkerId};
use super::work::Work;
use super::worker::{Port, PortShape, Worker, WorkerKind};
use crate::core::channel::{ArrayChannelFactory, Channel, ChannelFactory, Element};
use crate::core::error::{Result, StreamError};
use crate::core::messages::{MessageConstraint, MessageQueue, Portal, PortalId};

struct PendingWorker<T> {
    name: String,
    kind: WorkerKind,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    body: Box<dyn Work<T>>,
}

impl<T> PendingWorker<T> {
    fn label(&self, id: WorkerId) -> String {
        format!("{} ({})", self.name, id)
    }
}

struct PortalEntry {
    body_type: TypeId,
    body_type_name: &'static str,
    recipients: Vec<WorkerId>,
}

/// Assembles workers, channels, portals and message constraints into a
/// [`StreamGraph`].
///
/// Channels between workers come from the builder's [`ChannelFactory`].
/// Boundary channels can be supplied explicitly with
/// [`attach_input`](Self::attach_input) and
/// [`attach_output`](Self::attach_output); any filter or splitter still
/// without an input, and any filter or joiner still without an output, gets
/// one from the factory at [`build`](Self::build).
pub struct GraphBuilder<T> {
    workers: Vec<PendingWorker<T>>,
    channels: Vec<Box<dyn Channel<T>>>,
    portals: Vec<PortalEntry>,
    constraints: Vec<MessageConstraint>,
    factory: Arc<dyn ChannelFactory<T>>,
}

impl<T: Element> Default for GraphBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> GraphBuilder<T> {
    pub fn new() -> Self {
        Self::with_shared_factory(Arc::new(ArrayChannelFactory::default()))
    }

    pub fn with_factory(factory: impl ChannelFactory<T> + 'static) -> Self {
        Self::with_shared_factory(Arc::new(factory))
    }

    pub fn with_shared_factory(factory: Arc<dyn ChannelFactory<T>>) -> Self {
        Self {
            workers: Vec::new(),
            channels: Vec::new(),
            portals: Vec::new(),
            constraints: Vec::new(),
            factory,
        }
    }

    pub fn add_filter(&mut self, name: impl Into<String>, body: impl Work<T> + 'static) -> WorkerId {
        self.add_worker(WorkerKind::Filter, name.into(), Box::new(body))
    }

    pub fn add_splitter(
        &mut self,
        name: impl Into<String>,
        body: impl Work<T> + 'static,
    ) -> WorkerId {
        self.add_worker(WorkerKind::Splitter, name.into(), Box::new(body))
    }

    pub fn add_joiner(&mut self, name: impl Into<String>, body: impl Work<T> + 'static) -> WorkerId {
        self.add_worker(WorkerKind::Joiner, name.into(), Box::new(body))
    }

    pub fn add_worker(&mut self, kind: WorkerKind, name: String, body: Box<dyn Work<T>>) -> WorkerId {
        let id = WorkerId::new(self.workers.len());
        tracing::debug!("Adding {} '{}' as {}", kind, name, id);
        self.workers.push(PendingWorker {
            name,
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            body,
        });
        id
    }

    /// Connect the next output of `upstream` to the next input of
    /// `downstream` through a new factory channel.
    pub fn connect(&mut self, upstream: WorkerId, downstream: WorkerId) -> Result<ChannelId> {
        if upstream == downstream {
            return Err(StreamError::InvalidGraph(format!(
                "{} cannot feed itself",
                upstream
            )));
        }
        self.check_output_slot(upstream)?;
        self.check_input_slot(downstream)?;

        let channel = self.factory.make_channel(Some(upstream), Some(downstream));
        let id = self.push_channel(channel);
        self.workers[upstream.index()].outputs.push(Port {
            peer: Some(downstream),
            channel: id,
        });
        self.workers[downstream.index()].inputs.push(Port {
            peer: Some(upstream),
            channel: id,
        });
        tracing::debug!("Connected {} -> {} via {}", upstream, downstream, id);
        Ok(id)
    }

    /// Give `worker` a boundary input backed by `channel`.
    pub fn attach_input(&mut self, worker: WorkerId, channel: Box<dyn Channel<T>>) -> Result<ChannelId> {
        self.check_input_slot(worker)?;
        let id = self.push_channel(channel);
        self.workers[worker.index()]
            .inputs
            .push(Port { peer: None, channel: id });
        Ok(id)
    }

    /// Give `worker` a boundary output backed by `channel`.
    pub fn attach_output(&mut self, worker: WorkerId, channel: Box<dyn Channel<T>>) -> Result<ChannelId> {
        self.check_output_slot(worker)?;
        let id = self.push_channel(channel);
        self.workers[worker.index()]
            .outputs
            .push(Port { peer: None, channel: id });
        Ok(id)
    }

    /// New portal for messages to workers whose body is an `R`.
    pub fn portal<R: 'static>(&mut self) -> Portal<R> {
        let id = PortalId::new(self.portals.len());
        self.portals.push(PortalEntry {
            body_type: TypeId::of::<R>(),
            body_type_name: std::any::type_name::<R>(),
            recipients: Vec::new(),
        });
        Portal::new(id)
    }

    pub fn register_recipient<R: 'static>(&mut self, portal: &Portal<R>, worker: WorkerId) -> Result<()> {
        let pending = self.pending(worker)?;
        let body: &dyn Work<T> = &*pending.body;
        if !body.as_any().is::<R>() {
            return Err(StreamError::MalformedConstraint(format!(
                "{} is not a {}",
                pending.label(worker),
                std::any::type_name::<R>()
            )));
        }

        let entry = self
            .portals
            .get_mut(portal.id().index())
            .ok_or_else(|| StreamError::MalformedConstraint(format!("unknown portal {}", portal.id())))?;
        if entry.body_type != TypeId::of::<R>() {
            return Err(StreamError::MalformedConstraint(format!(
                "{} carries messages for {}",
                portal.id(),
                entry.body_type_name
            )));
        }
        if !entry.recipients.contains(&worker) {
            entry.recipients.push(worker);
        }
        Ok(())
    }

    /// Declare a message constraint. The recipient must already be registered
    /// on the constraint's portal.
    pub fn add_constraint(&mut self, constraint: MessageConstraint) -> Result<()> {
        self.pending(constraint.sender())?;
        self.pending(constraint.recipient())?;
        let entry = self.portals.get(constraint.portal().index()).ok_or_else(|| {
            StreamError::MalformedConstraint(format!("unknown portal {}", constraint.portal()))
        })?;
        if !entry.recipients.contains(&constraint.recipient()) {
            return Err(StreamError::MalformedConstraint(format!(
                "{} is not registered on {}",
                constraint.recipient(),
                constraint.portal()
            )));
        }
        if self.constraints.iter().any(|c| {
            c.sender() == constraint.sender()
                && c.recipient() == constraint.recipient()
                && c.portal() == constraint.portal()
        }) {
            return Err(StreamError::MalformedConstraint(format!(
                "duplicate constraint {}",
                constraint
            )));
        }
        tracing::debug!("Added message constraint {}", constraint);
        self.constraints.push(constraint);
        Ok(())
    }

    /// Expand a structured stream into workers and channels. Returns the
    /// head and tail workers of the expansion.
    pub fn add_stream(&mut self, element: StreamElement<T>) -> Result<(WorkerId, WorkerId)> {
        match element {
            StreamElement::Filter(spec) => {
                let id = self.add_spec(WorkerKind::Filter, spec);
                Ok((id, id))
            }
            StreamElement::Pipeline(children) => {
                let mut ends: Option<(WorkerId, WorkerId)> = None;
                for child in children {
                    let (head, tail) = self.add_stream(child)?;
                    ends = match ends {
                        None => Some((head, tail)),
                        Some((first, previous)) => {
                            self.connect(previous, head)?;
                            Some((first, tail))
                        }
                    };
                }
                ends.ok_or_else(|| StreamError::InvalidGraph("empty pipeline".into()))
            }
            StreamElement::Splitjoin {
                splitter,
                branches,
                joiner,
            } => {
                if branches.is_empty() {
                    return Err(StreamError::InvalidGraph(format!(
                        "splitjoin '{}' has no branches",
                        splitter.name
                    )));
                }
                let split = self.add_spec(WorkerKind::Splitter, splitter);
                let join = self.add_spec(WorkerKind::Joiner, joiner);
                for branch in branches {
                    let (head, tail) = self.add_stream(branch)?;
                    self.connect(split, head)?;
                    self.connect(tail, join)?;
                }
                Ok((split, join))
            }
        }
    }

    /// Finish the graph: attach missing boundary channels, resolve rates and
    /// index the topology.
    pub fn build(mut self) -> Result<StreamGraph<T>> {
        for index in 0..self.workers.len() {
            let id = WorkerId::new(index);
            let kind = self.workers[index].kind;
            if self.workers[index].inputs.is_empty() {
                if kind == WorkerKind::Joiner {
                    return Err(StreamError::InvalidGraph(format!(
                        "joiner {} has no inputs",
                        self.workers[index].label(id)
                    )));
                }
                let channel = self.factory.make_channel(None, Some(id));
                self.attach_input(id, channel)?;
            }
            if self.workers[index].outputs.is_empty() {
                if kind == WorkerKind::Splitter {
                    return Err(StreamError::InvalidGraph(format!(
                        "splitter {} has no outputs",
                        self.workers[index].label(id)
                    )));
                }
                let channel = self.factory.make_channel(Some(id), None);
                self.attach_output(id, channel)?;
            }
        }

        let mut topology = DiGraph::with_capacity(self.workers.len(), self.channels.len());
        for index in 0..self.workers.len() {
            topology.add_node(WorkerId::new(index));
        }

        let mut workers = Vec::with_capacity(self.workers.len());
        for (index, pending) in self.workers.into_iter().enumerate() {
            let id = WorkerId::new(index);
            let label = pending.label(id);
            let shape = PortShape {
                inputs: pending.inputs.len(),
                outputs: pending.outputs.len(),
            };
            let rates = pending.body.rates(shape);
            rates.check_shape(&label, shape)?;

            for port in &pending.outputs {
                if let Some(downstream) = port.peer {
                    topology.add_edge(node_index(id), node_index(downstream), port.channel);
                }
            }

            tracing::debug!(
                "Built {} with peek {:?} pop {:?} push {:?}",
                label,
                rates.peek,
                rates.pop,
                rates.push
            );
            workers.push(Worker {
                id,
                name: pending.name,
                kind: pending.kind,
                inputs: pending.inputs,
                outputs: pending.outputs,
                rates,
                executions: 0,
                messages: MessageQueue::new(),
                body: pending.body,
            });
        }

        tracing::info!(
            "Built stream graph with {} workers, {} channels, {} constraints",
            workers.len(),
            self.channels.len(),
            self.constraints.len()
        );
        Ok(StreamGraph {
            workers,
            channels: self.channels,
            constraints: self.constraints,
            portal_recipients: self
                .portals
                .into_iter()
                .map(|entry| entry.recipients)
                .collect(),
            topology,
        })
    }

    fn add_spec(&mut self, kind: WorkerKind, spec: WorkerSpec<T>) -> WorkerId {
        self.add_worker(kind, spec.name, spec.body)
    }

    fn push_channel(&mut self, channel: Box<dyn Channel<T>>) -> ChannelId {
        let id = ChannelId::new(self.channels.len());
        self.channels.push(channel);
        id
    }

    fn pending(&self, worker: WorkerId) -> Result<&PendingWorker<T>> {
        self.workers
            .get(worker.index())
            .ok_or_else(|| StreamError::InvalidGraph(format!("unknown worker {}", worker)))
    }

    fn check_input_slot(&self, worker: WorkerId) -> Result<()> {
        let pending = self.pending(worker)?;
        if !pending.kind.accepts_more_inputs(pending.inputs.len()) {
            return Err(StreamError::InvalidGraph(format!(
                "{} {} already has its input",
                pending.kind,
                pending.label(worker)
            )));
        }
        Ok(())
    }

    fn check_output_slot(&self, worker: WorkerId) -> Result<()> {
        let pending = self.pending(worker)?;
        if !pending.kind.accepts_more_outputs(pending.outputs.len()) {
            return Err(StreamError::InvalidGraph(format!(
                "{} {} already has its output",
                pending.kind,
                pending.label(worker)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::ArrayChannel;
    use crate::core::graph::WorkContext;
    use crate::core::graph::WorkerRates;
    use crate::core::rate::Rate;

    struct Pass;

    impl Work<i32> for Pass {
        fn rates(&self, _: PortShape) -> WorkerRates {
            WorkerRates::filter(Rate::exact(0), Rate::exact(1), Rate::exact(1))
        }

        fn work(&mut self, ctx: &mut WorkContext<'_, i32>) -> Result<()> {
            let x = ctx.pop()?;
            ctx.push(x)
        }
    }

    struct Fanout;

    impl Work<i32> for Fanout {
        fn rates(&self, shape: PortShape) -> WorkerRates {
            WorkerRates::new(
                vec![Rate::exact(0)],
                vec![Rate::exact(1)],
                vec![Rate::exact(1); shape.outputs],
            )
        }

        fn work(&mut self, ctx: &mut WorkContext<'_, i32>) -> Result<()> {
            let x = ctx.pop()?;
            for output in 0..ctx.output_count() {
                ctx.push_to(output, x)?;
            }
            Ok(())
        }
    }

    struct Merge;

    impl Work<i32> for Merge {
        fn rates(&self, shape: PortShape) -> WorkerRates {
            WorkerRates::new(
                vec![Rate::exact(0); shape.inputs],
                vec![Rate::exact(1); shape.inputs],
                vec![Rate::exact(shape.inputs)],
            )
        }

        fn work(&mut self, ctx: &mut WorkContext<'_, i32>) -> Result<()> {
            for input in 0..ctx.input_count() {
                let x = ctx.pop_from(input)?;
                ctx.push(x)?;
            }
            Ok(())
        }
    }

    struct WrongShape;

    impl Work<i32> for WrongShape {
        fn rates(&self, _: PortShape) -> WorkerRates {
            WorkerRates::new(vec![], vec![], vec![Rate::exact(1)])
        }

        fn work(&mut self, _: &mut WorkContext<'_, i32>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_build_attaches_boundaries() {
        let mut builder = GraphBuilder::<i32>::new();
        let a = builder.add_filter("a", Pass);
        let b = builder.add_filter("b", Pass);
        builder.connect(a, b).unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(graph.worker_count(), 2);
        assert_eq!(graph.channel_count(), 3);
        assert_eq!(graph.predecessors(a), vec![None]);
        assert_eq!(graph.successors(a), vec![Some(b)]);
        assert_eq!(graph.successors(b), vec![None]);
        assert_eq!(graph.find_sources(), vec![a]);
        assert_eq!(graph.find_sinks(), vec![b]);
    }

    #[test]
    fn test_filter_arity_is_enforced() {
        let mut builder = GraphBuilder::<i32>::new();
        let a = builder.add_filter("a", Pass);
        let b = builder.add_filter("b", Pass);
        let c = builder.add_filter("c", Pass);
        builder.connect(a, b).unwrap();
        assert!(matches!(builder.connect(a, c), Err(StreamError::InvalidGraph(_))));
        assert!(matches!(builder.connect(c, b), Err(StreamError::InvalidGraph(_))));
        assert!(matches!(builder.connect(c, c), Err(StreamError::InvalidGraph(_))));
        assert!(matches!(
            builder.attach_input(b, Box::new(ArrayChannel::new())),
            Err(StreamError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_explicit_boundaries_are_kept() {
        let mut builder = GraphBuilder::<i32>::new();
        let a = builder.add_filter("a", Pass);
        let input = builder
            .attach_input(a, Box::new(ArrayChannel::from_iter([1, 2])))
            .unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(graph.input_channels(a), vec![input]);
        assert_eq!(graph.channel(input).unwrap().size(), 2);
        assert_eq!(graph.channel_count(), 2);
    }

    #[test]
    fn test_add_stream_expands_splitjoin() {
        let mut builder = GraphBuilder::<i32>::new();
        let stream = StreamElement::pipeline([
            StreamElement::filter("head", Pass),
            StreamElement::splitjoin(
                WorkerSpec::new("split", Fanout),
                [
                    StreamElement::filter("left", Pass),
                    StreamElement::pipeline([
                        StreamElement::filter("right0", Pass),
                        StreamElement::filter("right1", Pass),
                    ]),
                ],
                WorkerSpec::new("join", Merge),
            ),
        ]);
        assert_eq!(stream.worker_count(), 6);

        let (head, tail) = builder.add_stream(stream).unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(graph.worker(head).unwrap().name(), "head");
        assert_eq!(graph.worker(tail).unwrap().name(), "join");
        let join = graph.worker(tail).unwrap();
        assert_eq!(join.inputs().len(), 2);
        assert_eq!(join.get_pop_rates(), &[Rate::exact(1), Rate::exact(1)]);
        assert_eq!(join.get_push_rates(), &[Rate::exact(2)]);
        assert_eq!(graph.reachable_from(head).len(), 6);
        assert_eq!(graph.find_sources(), vec![head]);
        assert_eq!(graph.find_sinks(), vec![tail]);
    }

    #[test]
    fn test_empty_compositions_are_rejected() {
        let mut builder = GraphBuilder::<i32>::new();
        assert!(matches!(
            builder.add_stream(StreamElement::pipeline([])),
            Err(StreamError::InvalidGraph(_))
        ));
        assert!(matches!(
            builder.add_stream(StreamElement::splitjoin(
                WorkerSpec::new("split", Fanout),
                [],
                WorkerSpec::new("join", Merge),
            )),
            Err(StreamError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_rates_must_match_ports() {
        let mut builder = GraphBuilder::<i32>::new();
        builder.add_filter("bad", WrongShape);
        assert!(matches!(builder.build(), Err(StreamError::InvalidGraph(_))));
    }

    #[test]
    fn test_portal_registration_checks_body_type() {
        let mut builder = GraphBuilder::<i32>::new();
        let a = builder.add_filter("a", Pass);
        let b = builder.add_filter("b", Fanout);
        let portal = builder.portal::<Pass>();

        builder.register_recipient(&portal, a).unwrap();
        assert!(matches!(
            builder.register_recipient(&portal, b),
            Err(StreamError::MalformedConstraint(_))
        ));

        builder
            .add_constraint(MessageConstraint::with_latency(b, a, portal.id(), 1))
            .unwrap();
        assert!(matches!(
            builder.add_constraint(MessageConstraint::with_latency(b, a, portal.id(), 2)),
            Err(StreamError::MalformedConstraint(_))
        ));
        assert!(matches!(
            builder.add_constraint(MessageConstraint::with_latency(a, b, portal.id(), 1)),
            Err(StreamError::MalformedConstraint(_))
        ));
    }
}

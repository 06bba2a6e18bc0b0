// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Stream graph interpreter: workers with declared peek, pop and push rates,
//! connected by channels, fired by a demand-driven pull scheduler that also
//! honors teleport message deadlines.

#![allow(clippy::type_complexity)] // Closure-typed message actions read clearly in context

pub mod core;

pub use crate::core::prelude;
pub use crate::core::{
    ArrayChannel, ArrayChannelFactory, BoundaryChannel, BoundaryDirection, BoundaryToken, Channel,
    ChannelFactory, ChannelId, ChannelKind, ChannelStats, CompiledStream, DebugChannel,
    DebugChannelFactory, DeliverySchedule, DuplicateSplitter, Element, FiringDelegate, FnFilter,
    GraphBuilder, Identity, Interpreter, InterpreterStats, MessageConstraint, Portal, PortalId,
    PortShape, Rate, RateAuditor, RateBound, RateKind, Result, RoundrobinJoiner,
    RoundrobinSplitter, StreamCompiler, StreamConfig, StreamElement, StreamError, StreamGraph,
    SynchronizedChannel, SynchronizedChannelFactory, Work, WorkContext, Worker, WorkerId,
    WorkerKind, WorkerRates, WorkerSpec, DYNAMIC,
};

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The stream graph: workers connected by channels, built once and then
//! driven by an interpreter.

mod builder;
mod element;
#[allow(clippy::module_inception)]
mod graph;
mod ids;
mod work;
mod worker;

pub use builder::GraphBuilder;
pub use element::{StreamElement, WorkerSpec};
pub use graph::{ChannelSummary, ConstraintSummary, GraphSummary, StreamGraph, WorkerSummary};
pub use ids::{ChannelId, WorkerId};
pub use work::{AsAny, Work, WorkContext};
pub use worker::{Port, PortShape, Worker, WorkerKind, WorkerRates};

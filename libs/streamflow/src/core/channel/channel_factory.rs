// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::array_channel::ArrayChannel;
use super::channel::{Channel, Element};
use super::debug_channel::DebugChannel;
use super::synchronized_channel::SynchronizedChannel;
use crate::core::graph::WorkerId;

/// Creates the channel backing one edge of a stream graph.
///
/// `upstream` is `None` for the overall graph input and `downstream` is `None`
/// for the overall graph output.
pub trait ChannelFactory<T>: Send + Sync {
    fn make_channel(
        &self,
        upstream: Option<WorkerId>,
        downstream: Option<WorkerId>,
    ) -> Box<dyn Channel<T>>;
}

/// Plain [`ArrayChannel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayChannelFactory {
    pub capacity: usize,
}

impl<T: Element> ChannelFactory<T> for ArrayChannelFactory {
    fn make_channel(&self, _: Option<WorkerId>, _: Option<WorkerId>) -> Box<dyn Channel<T>> {
        Box::new(ArrayChannel::with_capacity(self.capacity))
    }
}

/// Instrumented [`DebugChannel`]s, required by the rate auditor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugChannelFactory {
    pub capacity: usize,
}

impl<T: Element> ChannelFactory<T> for DebugChannelFactory {
    fn make_channel(&self, _: Option<WorkerId>, _: Option<WorkerId>) -> Box<dyn Channel<T>> {
        Box::new(DebugChannel::with_capacity(self.capacity))
    }
}

/// Thread-safe [`SynchronizedChannel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynchronizedChannelFactory {
    pub capacity: usize,
}

impl<T: Element> ChannelFactory<T> for SynchronizedChannelFactory {
    fn make_channel(&self, _: Option<WorkerId>, _: Option<WorkerId>) -> Box<dyn Channel<T>> {
        Box::new(SynchronizedChannel::with_capacity(self.capacity))
    }
}

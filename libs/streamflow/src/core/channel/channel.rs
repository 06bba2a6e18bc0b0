// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::Serialize;

use crate::core::error::Result;

/// Data that can flow through a stream graph.
pub trait Element: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Element for T {}

/// Ordered FIFO between one producer port and one consumer port, with
/// random-access peek relative to the current front.
pub trait Channel<T>: Send {
    /// Append an element at the back.
    fn push(&mut self, element: T);

    /// Remove and return the front element, or [`StreamError::EmptyChannel`].
    ///
    /// [`StreamError::EmptyChannel`]: crate::core::StreamError::EmptyChannel
    fn pop(&mut self) -> Result<T>;

    /// Element `index` positions from the front, or
    /// [`StreamError::IndexOutOfRange`] when `index >= size()`.
    ///
    /// [`StreamError::IndexOutOfRange`]: crate::core::StreamError::IndexOutOfRange
    fn peek(&self, index: usize) -> Result<T>;

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Counters since the last [`Channel::reset_stats`], for channels that
    /// keep them.
    fn stats(&self) -> Option<ChannelStats> {
        None
    }

    fn reset_stats(&mut self) {}
}

/// Instrumentation snapshot of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    /// Highest index passed to `peek`, if any.
    pub max_peek_index: Option<usize>,
    pub pop_count: usize,
    pub push_count: usize,
}

impl ChannelStats {
    /// Number of elements the consumer looked at: highest peek index plus one.
    pub fn peek_extent(&self) -> usize {
        self.max_peek_index.map_or(0, |index| index + 1)
    }
}

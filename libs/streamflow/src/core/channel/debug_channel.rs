// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::cell::Cell;
use std::collections::VecDeque;

use super::channel::{Channel, ChannelStats, Element};
use crate::core::error::{Result, StreamError};

/// FIFO that records the highest peek index and the pop/push counts since the
/// last reset, so a firing can be audited against its declared rates.
///
/// Failed peeks and pops are not counted.
#[derive(Debug)]
pub struct DebugChannel<T> {
    buffer: VecDeque<T>,
    max_peek_index: Cell<Option<usize>>,
    pop_count: usize,
    push_count: usize,
}

impl<T> DebugChannel<T> {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
            max_peek_index: Cell::new(None),
            pop_count: 0,
            push_count: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            ..Self::new()
        }
    }
}

impl<T> Default for DebugChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Channel<T> for DebugChannel<T> {
    fn push(&mut self, element: T) {
        self.buffer.push_back(element);
        self.push_count += 1;
    }

    fn pop(&mut self) -> Result<T> {
        let element = self.buffer.pop_front().ok_or(StreamError::EmptyChannel)?;
        self.pop_count += 1;
        Ok(element)
    }

    fn peek(&self, index: usize) -> Result<T> {
        let element = self
            .buffer
            .get(index)
            .cloned()
            .ok_or(StreamError::IndexOutOfRange {
                index,
                size: self.buffer.len(),
            })?;
        let highest = self.max_peek_index.get().map_or(index, |m| m.max(index));
        self.max_peek_index.set(Some(highest));
        Ok(element)
    }

    fn size(&self) -> usize {
        self.buffer.len()
    }

    fn stats(&self) -> Option<ChannelStats> {
        Some(ChannelStats {
            max_peek_index: self.max_peek_index.get(),
            pop_count: self.pop_count,
            push_count: self.push_count,
        })
    }

    fn reset_stats(&mut self) {
        self.max_peek_index.set(None);
        self.pop_count = 0;
        self.push_count = 0;
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::VecDeque;

use super::channel::{Channel, Element};
use crate::core::error::{Result, StreamError};

/// Unsynchronized, uninstrumented FIFO.
#[derive(Debug, Clone)]
pub struct ArrayChannel<T> {
    buffer: VecDeque<T>,
}

impl<T> ArrayChannel<T> {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }
}

impl<T> Default for ArrayChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ArrayChannel<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            buffer: iter.into_iter().collect(),
        }
    }
}

impl<T: Element> Channel<T> for ArrayChannel<T> {
    fn push(&mut self, element: T) {
        self.buffer.push_back(element);
    }

    fn pop(&mut self) -> Result<T> {
        self.buffer.pop_front().ok_or(StreamError::EmptyChannel)
    }

    fn peek(&self, index: usize) -> Result<T> {
        self.buffer
            .get(index)
            .cloned()
            .ok_or(StreamError::IndexOutOfRange {
                index,
                size: self.buffer.len(),
            })
    }

    fn size(&self) -> usize {
        self.buffer.len()
    }
}

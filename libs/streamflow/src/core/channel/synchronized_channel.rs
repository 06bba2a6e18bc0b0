// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::channel::{Channel, ChannelStats, Element};
use crate::core::error::{Result, StreamError};

#[derive(Debug)]
struct SharedBuffer<T> {
    buffer: VecDeque<T>,
    stats: ChannelStats,
}

/// Thread-safe FIFO handle. Clones share one buffer, so one clone can be the
/// output boundary of an interpreter on one thread and another clone the input
/// boundary of an interpreter on a different thread.
///
/// Each operation locks independently; a consumer that peeks and then pops
/// must be the only consumer of the buffer.
#[derive(Debug)]
pub struct SynchronizedChannel<T> {
    shared: Arc<Mutex<SharedBuffer<T>>>,
}

impl<T> SynchronizedChannel<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SharedBuffer {
                buffer: VecDeque::with_capacity(capacity),
                stats: ChannelStats::default(),
            })),
        }
    }

    /// Remove the front element if there is one. Convenient for polling
    /// threads that treat an empty channel as "nothing yet".
    pub fn try_pop(&self) -> Option<T> {
        let mut shared = self.shared.lock();
        let element = shared.buffer.pop_front()?;
        shared.stats.pop_count += 1;
        Some(element)
    }

    /// Push from a thread holding only a shared reference to the handle.
    pub fn offer(&self, element: T) {
        let mut shared = self.shared.lock();
        shared.buffer.push_back(element);
        shared.stats.push_count += 1;
    }
}

impl<T> Clone for SynchronizedChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for SynchronizedChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Channel<T> for SynchronizedChannel<T> {
    fn push(&mut self, element: T) {
        self.offer(element);
    }

    fn pop(&mut self) -> Result<T> {
        self.try_pop().ok_or(StreamError::EmptyChannel)
    }

    fn peek(&self, index: usize) -> Result<T> {
        let mut shared = self.shared.lock();
        let size = shared.buffer.len();
        let element = shared
            .buffer
            .get(index)
            .cloned()
            .ok_or(StreamError::IndexOutOfRange { index, size })?;
        let highest = shared
            .stats
            .max_peek_index
            .map_or(index, |m| m.max(index));
        shared.stats.max_peek_index = Some(highest);
        Ok(element)
    }

    fn size(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    fn stats(&self) -> Option<ChannelStats> {
        Some(self.shared.lock().stats)
    }

    fn reset_stats(&mut self) {
        self.shared.lock().stats = ChannelStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_buffer() {
        let mut producer = SynchronizedChannel::new();
        let mut consumer = producer.clone();

        producer.push(7);
        producer.push(8);
        assert_eq!(consumer.size(), 2);
        assert_eq!(consumer.peek(1).unwrap(), 8);
        assert_eq!(consumer.pop().unwrap(), 7);
        assert_eq!(producer.size(), 1);
    }

    #[test]
    fn test_cross_thread_handoff() {
        let producer = SynchronizedChannel::with_capacity(128);
        let consumer = producer.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                producer.offer(i);
            }
        });
        handle.join().unwrap();

        let drained: Vec<i32> = std::iter::from_fn(|| consumer.try_pop()).collect();
        assert_eq!(drained, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_pop_fails() {
        let mut channel: SynchronizedChannel<i32> = SynchronizedChannel::default();
        assert!(matches!(channel.pop(), Err(StreamError::EmptyChannel)));
        assert!(channel.try_pop().is_none());
    }
}

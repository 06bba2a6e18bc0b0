// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::portal::PortalId;
use crate::core::error::Result;

/// Closure captured at send time and invoked on the recipient body at
/// delivery time.
pub(crate) type MessageAction = Arc<dyn Fn(&mut dyn Any) -> Result<()> + Send + Sync>;

/// A message produced by a work routine, not yet routed to recipients.
pub(crate) struct OutgoingMessage {
    pub(crate) portal: PortalId,
    pub(crate) action: MessageAction,
}

/// A message waiting in a recipient's queue.
#[derive(Clone)]
pub struct Message {
    portal: PortalId,
    delivery_time: u64,
    action: MessageAction,
}

impl Message {
    pub(crate) fn new(portal: PortalId, delivery_time: u64, action: MessageAction) -> Self {
        Self {
            portal,
            delivery_time,
            action,
        }
    }

    pub fn portal(&self) -> PortalId {
        self.portal
    }

    /// Recipient execution count at which the message is delivered: just
    /// before the firing that brings the count to this value.
    pub fn delivery_time(&self) -> u64 {
        self.delivery_time
    }

    pub(crate) fn deliver(&self, recipient: &mut dyn Any) -> Result<()> {
        (self.action)(recipient)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("portal", &self.portal)
            .field("delivery_time", &self.delivery_time)
            .finish_non_exhaustive()
    }
}

/// Pending messages of one worker, ascending by delivery time. Messages with
/// equal delivery times keep their send order.
#[derive(Debug, Default)]
pub struct MessageQueue {
    queue: VecDeque<Message>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, message: Message) {
        let at = self
            .queue
            .partition_point(|queued| queued.delivery_time <= message.delivery_time);
        self.queue.insert(at, message);
    }

    pub fn front_delivery_time(&self) -> Option<u64> {
        self.queue.front().map(Message::delivery_time)
    }

    pub fn pop_front(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.queue.iter()
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::sync::Arc;

use super::portal::PortalId;
use crate::core::graph::WorkerId;

/// Maps the sender's completed-execution count at send time to the
/// recipient execution count at which the message must be delivered.
#[derive(Clone)]
pub enum DeliverySchedule {
    /// `sender_executions + latency`, saturating at zero.
    Latency(i64),
    Custom(Arc<dyn Fn(u64) -> u64 + Send + Sync>),
}

impl DeliverySchedule {
    pub fn delivery_time(&self, sender_executions: u64) -> u64 {
        match self {
            DeliverySchedule::Latency(latency) => sender_executions.saturating_add_signed(*latency),
            DeliverySchedule::Custom(schedule) => schedule(sender_executions),
        }
    }
}

impl fmt::Debug for DeliverySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliverySchedule::Latency(latency) => f.debug_tuple("Latency").field(latency).finish(),
            DeliverySchedule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Static declaration that `sender` may message `recipient` through `portal`,
/// with deliveries computed by `schedule`.
#[derive(Debug, Clone)]
pub struct MessageConstraint {
    sender: WorkerId,
    recipient: WorkerId,
    portal: PortalId,
    schedule: DeliverySchedule,
}

impl MessageConstraint {
    pub fn new(
        sender: WorkerId,
        recipient: WorkerId,
        portal: PortalId,
        schedule: DeliverySchedule,
    ) -> Self {
        Self {
            sender,
            recipient,
            portal,
            schedule,
        }
    }

    /// Deliveries at `sender_executions + latency`.
    pub fn with_latency(
        sender: WorkerId,
        recipient: WorkerId,
        portal: PortalId,
        latency: i64,
    ) -> Self {
        Self::new(sender, recipient, portal, DeliverySchedule::Latency(latency))
    }

    pub fn sender(&self) -> WorkerId {
        self.sender
    }

    pub fn recipient(&self) -> WorkerId {
        self.recipient
    }

    pub fn portal(&self) -> PortalId {
        self.portal
    }

    pub fn schedule(&self) -> &DeliverySchedule {
        &self.schedule
    }

    pub fn delivery_time(&self, sender_executions: u64) -> u64 {
        self.schedule.delivery_time(sender_executions)
    }

    /// Same sender, recipient and portal. A graph holds at most one
    /// constraint per route.
    pub fn same_route(&self, other: &MessageConstraint) -> bool {
        self.sender == other.sender
            && self.recipient == other.recipient
            && self.portal == other.portal
    }
}

impl fmt::Display for MessageConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} via {} ({:?})",
            self.sender, self.recipient, self.portal, self.schedule
        )
    }
}

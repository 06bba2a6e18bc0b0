// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Teleport messages: out-of-band calls delivered to a worker just before a
//! precomputed future firing.

mod constraint;
mod message;
mod portal;

pub use constraint::{DeliverySchedule, MessageConstraint};
pub use message::{Message, MessageQueue};
pub use portal::{Portal, PortalId};

pub(crate) use message::{MessageAction, OutgoingMessage};

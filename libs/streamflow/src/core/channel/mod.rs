// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Channels: the FIFO buffers behind every graph edge and boundary.

mod array_channel;
#[allow(clippy::module_inception)]
mod channel;
mod channel_factory;
mod debug_channel;
mod synchronized_channel;

pub use array_channel::ArrayChannel;
pub use channel::{Channel, ChannelStats, Element};
pub use channel_factory::{
    ArrayChannelFactory, ChannelFactory, DebugChannelFactory, SynchronizedChannelFactory,
};
pub use debug_channel::DebugChannel;
pub use synchronized_channel::SynchronizedChannel;

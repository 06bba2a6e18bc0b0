// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod channel;
pub mod config;
pub mod error;
pub mod graph;
pub mod interpreter;
pub mod messages;
pub mod prelude;
pub mod rate;
pub mod stream;
pub mod workers;

pub use channel::*;
pub use config::{ChannelKind, StreamConfig};
pub use error::*;
pub use graph::*;
pub use interpreter::*;
pub use messages::*;
pub use rate::{DYNAMIC, Rate, RateBound};
pub use stream::*;
pub use workers::*;

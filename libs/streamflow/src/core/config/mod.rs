// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod stream_config;

pub use stream_config::{ChannelKind, StreamConfig};

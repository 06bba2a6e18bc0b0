// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::graph::{ChannelId, WorkerId};

/// Opaque name of one boundary channel of an interpreter section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryToken(usize);

impl BoundaryToken {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for BoundaryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Whether a boundary channel feeds the section or drains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryDirection {
    Input,
    Output,
}

impl BoundaryDirection {
    pub fn is_input(&self) -> bool {
        matches!(self, BoundaryDirection::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, BoundaryDirection::Output)
    }
}

impl From<BoundaryDirection> for petgraph::Direction {
    fn from(direction: BoundaryDirection) -> Self {
        match direction {
            BoundaryDirection::Input => petgraph::Direction::Incoming,
            BoundaryDirection::Output => petgraph::Direction::Outgoing,
        }
    }
}

/// A channel crossing the section boundary. `upstream` is `None` for the
/// overall graph input; `downstream` is `None` for the overall graph output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryChannel {
    channel: ChannelId,
    upstream: Option<WorkerId>,
    downstream: Option<WorkerId>,
    direction: BoundaryDirection,
}

impl BoundaryChannel {
    pub(crate) fn input(channel: ChannelId, upstream: Option<WorkerId>, worker: WorkerId) -> Self {
        Self {
            channel,
            upstream,
            downstream: Some(worker),
            direction: BoundaryDirection::Input,
        }
    }

    pub(crate) fn output(channel: ChannelId, worker: WorkerId, downstream: Option<WorkerId>) -> Self {
        Self {
            channel,
            upstream: Some(worker),
            downstream,
            direction: BoundaryDirection::Output,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn upstream_worker(&self) -> Option<WorkerId> {
        self.upstream
    }

    pub fn downstream_worker(&self) -> Option<WorkerId> {
        self.downstream
    }

    pub fn direction(&self) -> BoundaryDirection {
        self.direction
    }

    pub fn is_input(&self) -> bool {
        self.direction.is_input()
    }

    pub fn is_output(&self) -> bool {
        self.direction.is_output()
    }

    /// The in-section worker this channel attaches to.
    pub fn worker(&self) -> Option<WorkerId> {
        match self.direction {
            BoundaryDirection::Input => self.downstream,
            BoundaryDirection::Output => self.upstream,
        }
    }
}

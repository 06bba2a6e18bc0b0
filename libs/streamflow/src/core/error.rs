// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

use crate::core::rate::Rate;

/// Which declared rate an audited firing was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Peek,
    Pop,
    Push,
}

impl std::fmt::Display for RateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateKind::Peek => write!(f, "peek"),
            RateKind::Pop => write!(f, "pop"),
            RateKind::Push => write!(f, "push"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Illegal rate: {0}")]
    InvalidRate(String),

    #[error("Pop from empty channel")]
    EmptyChannel,

    #[error("Peek index {index} out of range for channel of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Malformed message constraint: {0}")]
    MalformedConstraint(String),

    #[error("Unsatisfiable message constraints at worker {worker}")]
    UnsatisfiableConstraints { worker: String },

    #[error(
        "Unbounded input rates not yet supported: worker {worker} channel {channel} (peek {peek}, pop {pop})"
    )]
    UnsupportedRate {
        worker: String,
        channel: usize,
        peek: Rate,
        pop: Rate,
    },

    #[error("{worker}: {kind} rate {declared} but observed {observed} on channel {channel}")]
    RateViolation {
        worker: String,
        channel: usize,
        kind: RateKind,
        declared: Rate,
        observed: usize,
    },

    #[error("Message delivery missed at worker {worker}: executions {executions}, delivery time {delivery_time}")]
    MissedMessage {
        worker: String,
        executions: u64,
        delivery_time: u64,
    },

    #[error("Message delivery failed: {0}")]
    MessageDelivery(String),

    #[error("Invalid stream graph: {0}")]
    InvalidGraph(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;

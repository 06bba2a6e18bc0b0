// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pull scheduling of a stream graph section.

mod boundary;
mod delegate;
#[allow(clippy::module_inception)]
mod interpreter;
mod rate_audit;
mod stats;

pub use boundary::{BoundaryChannel, BoundaryDirection, BoundaryToken};
pub use delegate::{DefaultFiringDelegate, FiringDelegate};
pub use interpreter::Interpreter;
pub use rate_audit::RateAuditor;
pub use stats::InterpreterStats;

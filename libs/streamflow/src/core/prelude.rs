// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Commonly used types for `use streamflow::prelude::*`.

pub use crate::core::{
    // Errors
    error::{Result, StreamError},

    // Graph assembly
    graph::{
        GraphBuilder, PortShape, StreamElement, Work, WorkContext, WorkerId, WorkerRates,
        WorkerSpec,
    },

    // Rates
    rate::{DYNAMIC, Rate},

    // Messages
    messages::{MessageConstraint, Portal},

    // Execution
    interpreter::Interpreter,
    stream::{CompiledStream, StreamCompiler},
};

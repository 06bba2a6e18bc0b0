// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compiling stream descriptions into runnable streams.

mod compiled_stream;
mod compiler;

pub use compiled_stream::CompiledStream;
pub use compiler::StreamCompiler;

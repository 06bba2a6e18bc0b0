// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use parking_lot::Mutex;

use crate::core::channel::Element;
use crate::core::error::{Result, StreamError};
use crate::core::graph::WorkerId;
use crate::core::interpreter::{BoundaryToken, Interpreter, InterpreterStats};

struct CompiledStreamState<T> {
    interpreter: Interpreter<T>,
    input: BoundaryToken,
    output: BoundaryToken,
    draining: bool,
    check_pending_messages: bool,
}

/// A compiled stream graph with one input and one output, driven by an
/// interpreter on the calling thread.
///
/// Every operation takes the internal lock, so a compiled stream can be
/// shared between a producer and a consumer thread.
pub struct CompiledStream<T> {
    state: Mutex<CompiledStreamState<T>>,
}

impl<T: Element> CompiledStream<T> {
    pub(crate) fn new(
        interpreter: Interpreter<T>,
        head: WorkerId,
        tail: WorkerId,
        check_pending_messages: bool,
    ) -> Result<Self> {
        let inputs: Vec<BoundaryToken> = interpreter.input_tokens().collect();
        let outputs: Vec<BoundaryToken> = interpreter.output_tokens().collect();
        let (&[input], &[output]) = (inputs.as_slice(), outputs.as_slice()) else {
            return Err(StreamError::InvalidGraph(format!(
                "compiled stream needs exactly one input and one output, found {} and {}",
                inputs.len(),
                outputs.len()
            )));
        };

        let feeds_head = interpreter
            .boundary(input)
            .and_then(|boundary| boundary.worker())
            == Some(head);
        let drains_tail = interpreter
            .boundary(output)
            .and_then(|boundary| boundary.worker())
            == Some(tail);
        if !feeds_head || !drains_tail {
            return Err(StreamError::InvalidGraph(format!(
                "stream boundaries must attach to head {} and tail {}",
                head, tail
            )));
        }

        Ok(Self {
            state: Mutex::new(CompiledStreamState {
                interpreter,
                input,
                output,
                draining: false,
                check_pending_messages,
            }),
        })
    }

    /// Push one element and interpret. Returns `false`, without consuming the
    /// element, once draining has begun.
    pub fn offer(&self, element: T) -> Result<bool> {
        let mut state = self.state.lock();
        if state.draining {
            return Ok(false);
        }
        let input = state.input;
        let channel = state
            .interpreter
            .channel_mut(input)
            .ok_or_else(|| StreamError::InvalidGraph(format!("missing input boundary {}", input)))?;
        channel.push(element);
        state.interpreter.interpret()?;
        Ok(true)
    }

    /// Next output element, if one is ready.
    pub fn poll(&self) -> Option<T> {
        let mut state = self.state.lock();
        let output = state.output;
        state.interpreter.channel_mut(output)?.pop().ok()
    }

    /// Stop accepting input, run to a fixpoint, and report whether nothing
    /// was left behind: input boundary and every internal channel empty and,
    /// if configured, no undelivered messages. Output still waiting to be
    /// polled does not count.
    pub fn drain(&self) -> Result<bool> {
        let mut state = self.state.lock();
        state.draining = true;
        state.interpreter.interpret()?;

        let output_channel = state
            .interpreter
            .boundary(state.output)
            .map(|boundary| boundary.channel());
        let graph = state.interpreter.graph();
        let undrained: usize = graph
            .channel_ids()
            .filter(|&id| Some(id) != output_channel)
            .filter_map(|id| graph.channel(id))
            .map(|channel| channel.size())
            .sum();
        let pending = if state.check_pending_messages {
            graph.pending_messages()
        } else {
            0
        };

        let drained = undrained == 0 && pending == 0;
        if drained {
            tracing::debug!("Stream fully drained");
        } else {
            tracing::warn!(
                "Stream drained with {} buffered elements and {} pending messages left",
                undrained,
                pending
            );
        }
        Ok(drained)
    }

    pub fn is_draining(&self) -> bool {
        self.state.lock().draining
    }

    pub fn stats(&self) -> InterpreterStats {
        self.state.lock().interpreter.stats()
    }

    /// Run `f` against the interpreter while holding the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&Interpreter<T>) -> R) -> R {
        f(&self.state.lock().interpreter)
    }
}

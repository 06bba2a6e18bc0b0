// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::compiled_stream::CompiledStream;
use crate::core::channel::Element;
use crate::core::config::{ChannelKind, StreamConfig};
use crate::core::error::Result;
use crate::core::graph::{GraphBuilder, StreamElement, WorkerId};
use crate::core::interpreter::{Interpreter, RateAuditor};

/// Turns a stream description into a [`CompiledStream`] run by the
/// interpreter.
#[derive(Debug, Clone, Default)]
pub struct StreamCompiler {
    config: StreamConfig,
}

impl StreamCompiler {
    /// Plain interpreter with array channels.
    pub fn interpreter() -> Self {
        Self::default()
    }

    /// Interpreter that audits every firing against the declared rates.
    pub fn debug() -> Self {
        Self {
            config: StreamConfig {
                audit_rates: true,
                channel: ChannelKind::Debug,
                ..StreamConfig::default()
            },
        }
    }

    pub fn from_config(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn compile<T: Element>(&self, stream: StreamElement<T>) -> Result<CompiledStream<T>> {
        self.compile_with(|builder| builder.add_stream(stream))
    }

    /// Compile a graph assembled by hand. `assemble` returns the head and
    /// tail workers; they must end up owning the only boundary channels.
    pub fn compile_with<T, F>(&self, assemble: F) -> Result<CompiledStream<T>>
    where
        T: Element,
        F: FnOnce(&mut GraphBuilder<T>) -> Result<(WorkerId, WorkerId)>,
    {
        let mut builder = GraphBuilder::with_shared_factory(self.config.channel_factory::<T>());
        let (head, tail) = assemble(&mut builder)?;
        let graph = builder.build()?;

        let mut interpreter = Interpreter::for_graph(graph)?.with_max_passes(self.config.max_passes);
        if self.config.audit_rates {
            interpreter = interpreter.with_delegate(Arc::new(RateAuditor));
        }

        tracing::info!(
            "Compiled stream {} -> {} (audit_rates: {}, channel: {:?})",
            head,
            tail,
            self.config.audit_rates,
            self.config.effective_channel()
        );
        CompiledStream::new(interpreter, head, tail, self.config.check_pending_messages)
    }
}

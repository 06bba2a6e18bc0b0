// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::delegate::FiringDelegate;
use crate::core::error::{RateKind, Result, StreamError};
use crate::core::graph::{ChannelId, StreamGraph, WorkerId};
use crate::core::rate::Rate;

/// Checks every firing against the worker's declared rates.
///
/// Requires a [`DebugChannel`] on every port of every audited worker. After a
/// firing, each input channel's observed peek extent and pop count, and each
/// output channel's push count, must fall inside the declared rate. Channel
/// statistics are reset once checked.
///
/// A [`SynchronizedChannel`] keeps counters too, but they are shared with the
/// interpreter on the other end of the boundary, so its traffic would be
/// counted against this worker. The compiler refuses to audit over them.
///
/// [`DebugChannel`]: crate::core::channel::DebugChannel
/// [`SynchronizedChannel`]: crate::core::channel::SynchronizedChannel
#[derive(Debug, Clone, Copy, Default)]
pub struct RateAuditor;

impl<T: 'static> FiringDelegate<T> for RateAuditor {
    fn after_fire(&self, graph: &mut StreamGraph<T>, worker: WorkerId) -> Result<()> {
        let Some(fired) = graph.worker(worker) else {
            return Err(StreamError::InvalidGraph(format!("unknown worker {}", worker)));
        };
        let label = fired.label();
        let inputs: Vec<(ChannelId, Rate, Rate)> = fired
            .input_channels()
            .zip(fired.get_peek_rates())
            .zip(fired.get_pop_rates())
            .map(|((channel, peek), pop)| (channel, *peek, *pop))
            .collect();
        let outputs: Vec<(ChannelId, Rate)> = fired
            .output_channels()
            .zip(fired.get_push_rates().iter().copied())
            .collect();

        for (index, (channel, peek, pop)) in inputs.into_iter().enumerate() {
            let stats = instrumented(graph, &label, channel)?;
            check(&label, index, RateKind::Peek, peek, stats.peek_extent())?;
            check(&label, index, RateKind::Pop, pop, stats.pop_count)?;
            graph.reset_channel_stats(channel);
        }
        for (index, (channel, push)) in outputs.into_iter().enumerate() {
            let stats = instrumented(graph, &label, channel)?;
            check(&label, index, RateKind::Push, push, stats.push_count)?;
            graph.reset_channel_stats(channel);
        }
        Ok(())
    }
}

fn instrumented<T: 'static>(
    graph: &StreamGraph<T>,
    label: &str,
    channel: ChannelId,
) -> Result<crate::core::channel::ChannelStats> {
    graph.channel_stats(channel).ok_or_else(|| {
        StreamError::Configuration(format!(
            "rate auditing needs instrumented channels, but {} of {} is not",
            channel, label
        ))
    })
}

fn check(label: &str, channel: usize, kind: RateKind, declared: Rate, observed: usize) -> Result<()> {
    if declared.admits(observed) {
        return Ok(());
    }
    tracing::warn!(
        "{}: {} rate {} violated on channel {} (observed {})",
        label,
        kind,
        declared,
        channel,
        observed
    );
    Err(StreamError::RateViolation {
        worker: label.to_string(),
        channel,
        kind,
        declared,
        observed,
    })
}

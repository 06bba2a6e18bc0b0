// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;

use super::work::Work;

/// A named work body waiting to be placed in a graph.
pub struct WorkerSpec<T> {
    pub(crate) name: String,
    pub(crate) body: Box<dyn Work<T>>,
}

impl<T: 'static> WorkerSpec<T> {
    pub fn new(name: impl Into<String>, body: impl Work<T> + 'static) -> Self {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Debug for WorkerSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Structured stream composition, flattened into workers and channels by
/// [`GraphBuilder::add_stream`](super::GraphBuilder::add_stream).
#[derive(Debug)]
pub enum StreamElement<T> {
    Filter(WorkerSpec<T>),
    /// Children connected head to tail, in order.
    Pipeline(Vec<StreamElement<T>>),
    /// A splitter feeding each branch, whose tails all feed a joiner.
    Splitjoin {
        splitter: WorkerSpec<T>,
        branches: Vec<StreamElement<T>>,
        joiner: WorkerSpec<T>,
    },
}

impl<T: 'static> StreamElement<T> {
    pub fn filter(name: impl Into<String>, body: impl Work<T> + 'static) -> Self {
        StreamElement::Filter(WorkerSpec::new(name, body))
    }

    pub fn pipeline(children: impl IntoIterator<Item = StreamElement<T>>) -> Self {
        StreamElement::Pipeline(children.into_iter().collect())
    }

    pub fn splitjoin(
        splitter: WorkerSpec<T>,
        branches: impl IntoIterator<Item = StreamElement<T>>,
        joiner: WorkerSpec<T>,
    ) -> Self {
        StreamElement::Splitjoin {
            splitter,
            branches: branches.into_iter().collect(),
            joiner,
        }
    }

    /// Number of workers the element expands to.
    pub fn worker_count(&self) -> usize {
        match self {
            StreamElement::Filter(_) => 1,
            StreamElement::Pipeline(children) => children.iter().map(Self::worker_count).sum(),
            StreamElement::Splitjoin { branches, .. } => {
                2 + branches.iter().map(Self::worker_count).sum::<usize>()
            }
        }
    }
}

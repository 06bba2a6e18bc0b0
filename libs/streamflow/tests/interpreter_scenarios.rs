// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pull scheduling over whole graphs and sections.

mod common;

use std::sync::Arc;

use common::{Batcher, Multiplier, PairwiseSum, PeekingAdder, endpoints, pop_all, push_all};
use parking_lot::Mutex;
use streamflow::prelude::*;
use streamflow::{FiringDelegate, Identity, RoundrobinJoiner, StreamGraph};

fn single(body: impl Work<i64> + 'static) -> (Interpreter<i64>, WorkerId) {
    let mut builder = GraphBuilder::new();
    let id = builder.add_filter("only", body);
    let interpreter = Interpreter::for_graph(builder.build().unwrap()).unwrap();
    (interpreter, id)
}

#[test]
fn test_identity_filter_passes_everything_in_order() {
    common::init_tracing();
    let (mut interpreter, id) = single(Identity);
    let (input, output) = endpoints(&interpreter);

    push_all(&mut interpreter, input, &[1, 2, 3, 4, 5]);
    assert!(interpreter.interpret().unwrap());

    assert_eq!(pop_all(&mut interpreter, output), vec![1, 2, 3, 4, 5]);
    assert_eq!(interpreter.graph().executions(id), Some(5));
}

#[test]
fn test_pairwise_sum_leaves_remainder_buffered() {
    let (mut interpreter, id) = single(PairwiseSum);
    let (input, output) = endpoints(&interpreter);

    push_all(&mut interpreter, input, &[1, 2, 3, 4, 5]);
    assert!(interpreter.interpret().unwrap());

    assert_eq!(interpreter.graph().executions(id), Some(2));
    assert_eq!(pop_all(&mut interpreter, output), vec![3, 7]);
    assert_eq!(interpreter.channel(input).unwrap().size(), 1);
    assert_eq!(interpreter.channel(input).unwrap().peek(0).unwrap(), 5);
}

#[test]
fn test_pull_recurses_upstream() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_filter("a", Multiplier(10));
    let b = builder.add_filter("b", PairwiseSum);
    builder.connect(a, b).unwrap();
    let mut interpreter = Interpreter::for_graph(builder.build().unwrap()).unwrap();
    assert_eq!(interpreter.sinks(), &[b]);
    let (input, output) = endpoints(&interpreter);

    push_all(&mut interpreter, input, &[1, 2, 3, 4, 5, 6, 7]);
    assert!(interpreter.interpret().unwrap());

    // The fourth pull of b stalls after a has consumed the last input.
    assert_eq!(interpreter.graph().executions(b), Some(3));
    assert_eq!(interpreter.graph().executions(a), Some(7));
    assert_eq!(pop_all(&mut interpreter, output), vec![30, 70, 110]);
    assert_eq!(interpreter.graph().channel_count(), 3);
}

#[test]
fn test_peeking_worker_waits_for_window() {
    let (mut interpreter, id) = single(PeekingAdder { window: 3 });
    let (input, output) = endpoints(&interpreter);

    push_all(&mut interpreter, input, &[1, 2]);
    assert!(!interpreter.interpret().unwrap());
    assert_eq!(interpreter.graph().executions(id), Some(0));

    push_all(&mut interpreter, input, &[3, 4, 5]);
    assert!(interpreter.interpret().unwrap());
    assert_eq!(pop_all(&mut interpreter, output), vec![6, 9, 12]);
    // Two elements stay behind: the window needs three.
    assert_eq!(interpreter.channel(input).unwrap().size(), 2);
}

#[test]
fn test_executions_count_firings() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_filter("batch", Batcher { copies: 3 });
    let b = builder.add_filter("sum", PairwiseSum);
    let c = builder.add_filter("double", Multiplier(2));
    builder.connect(a, b).unwrap();
    builder.connect(b, c).unwrap();
    let mut interpreter = Interpreter::for_graph(builder.build().unwrap()).unwrap();
    let (input, output) = endpoints(&interpreter);

    let mut last = [0u64; 3];
    for round in 1..=4 {
        push_all(&mut interpreter, input, &[round]);
        interpreter.interpret().unwrap();

        let graph = interpreter.graph();
        let now = [a, b, c].map(|id| graph.executions(id).unwrap());
        for (before, after) in last.iter().zip(now) {
            assert!(after >= *before);
        }
        last = now;
    }

    // 4 inputs, 12 batched, 6 sums, 6 doubled.
    assert_eq!(last, [4, 6, 6]);
    let stats = interpreter.stats();
    assert_eq!(stats.firings, 16);
    assert_eq!(stats.interpret_calls, 4);
    assert_eq!(pop_all(&mut interpreter, output), vec![4, 6, 8, 12, 14, 16]);
}

#[test]
fn test_interpret_reaches_fixpoint() {
    let mut builder = GraphBuilder::new();
    let stream = StreamElement::pipeline([
        StreamElement::filter("x2", Multiplier(2)),
        StreamElement::filter("sum", PairwiseSum),
        StreamElement::filter("x3", Multiplier(3)),
    ]);
    builder.add_stream(stream).unwrap();
    let mut interpreter = Interpreter::for_graph(builder.build().unwrap()).unwrap();
    let (input, output) = endpoints(&interpreter);

    push_all(&mut interpreter, input, &(1..=9).collect::<Vec<i64>>());
    assert!(interpreter.interpret().unwrap());
    assert!(!interpreter.interpret().unwrap());
    assert_eq!(pop_all(&mut interpreter, output), vec![18, 42, 66, 90]);
}

#[test]
fn test_sections_split_a_pipeline() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_filter("a", Multiplier(2));
    let b = builder.add_filter("b", Multiplier(3));
    builder.connect(a, b).unwrap();
    let graph: StreamGraph<i64> = builder.build().unwrap();
    let between = graph.output_channels(a)[0];

    let mut upper = Interpreter::new(graph, [a], []).unwrap();
    let tokens: Vec<_> = upper.channels().keys().copied().collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(upper.sinks(), &[a]);

    let input = upper.input_tokens().next().unwrap();
    let output = upper.output_tokens().next().unwrap();
    assert_eq!(upper.boundary(output).unwrap().channel(), between);
    assert_eq!(upper.boundary(output).unwrap().downstream_worker(), Some(b));

    push_all(&mut upper, input, &[1, 2, 3]);
    assert!(upper.interpret().unwrap());
    assert_eq!(upper.graph().executions(b), Some(0));
    assert_eq!(pop_all(&mut upper, output), vec![2, 4, 6]);
}

#[test]
fn test_graph_exports() {
    let mut builder = GraphBuilder::<i64>::new();
    let a = builder.add_filter("scale", Multiplier(2));
    let b = builder.add_filter("sum", PairwiseSum);
    builder.connect(a, b).unwrap();
    let graph = builder.build().unwrap();

    let json = graph.to_json().unwrap();
    assert_eq!(json["workers"][0]["name"], "scale");
    assert_eq!(json["workers"][1]["kind"], "filter");
    assert_eq!(json["channels"].as_array().unwrap().len(), 3);

    let dot = graph.to_dot();
    assert!(dot.contains("scale (w0)"));
    assert!(dot.contains("sum (w1)"));
    assert!(dot.contains("->"));
}

/// Records every firing in order.
#[derive(Default)]
struct FiringLog {
    fired: Mutex<Vec<WorkerId>>,
}

impl FiringDelegate<i64> for FiringLog {
    fn after_fire(&self, _: &mut StreamGraph<i64>, worker: WorkerId) -> Result<()> {
        self.fired.lock().push(worker);
        Ok(())
    }
}

#[test]
fn test_lowest_index_starved_input_is_pulled_first() {
    let mut builder = GraphBuilder::new();
    // Declared first so it has the lower id, but wired to the joiner's
    // second input.
    let right = builder.add_filter("right", Multiplier(10));
    let left = builder.add_filter("left", Identity);
    let join = builder.add_joiner("join", RoundrobinJoiner::new());
    builder.connect(left, join).unwrap();
    builder.connect(right, join).unwrap();

    let log = Arc::new(FiringLog::default());
    let mut interpreter = Interpreter::for_graph(builder.build().unwrap())
        .unwrap()
        .with_delegate(log.clone());
    assert_eq!(interpreter.sinks(), &[join]);

    let feed = |worker: WorkerId| {
        interpreter
            .input_tokens()
            .find(|&token| interpreter.boundary(token).unwrap().worker() == Some(worker))
            .unwrap()
    };
    let (left_in, right_in) = (feed(left), feed(right));
    let output = interpreter.output_tokens().next().unwrap();
    push_all(&mut interpreter, left_in, &[1]);
    push_all(&mut interpreter, right_in, &[2]);

    assert!(interpreter.interpret().unwrap());
    assert_eq!(*log.fired.lock(), vec![left, right, join]);
    assert_eq!(pop_all(&mut interpreter, output), vec![1, 20]);
}

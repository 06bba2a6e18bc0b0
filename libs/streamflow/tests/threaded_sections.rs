// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Independent interpreters on separate threads joined by synchronized
//! channels.

mod common;

use std::thread;

use common::{Multiplier, PairwiseSum};
use streamflow::prelude::*;
use streamflow::SynchronizedChannel;

fn section(
    name: &str,
    body: impl Work<i64> + 'static,
    input: &SynchronizedChannel<i64>,
    output: &SynchronizedChannel<i64>,
) -> (Interpreter<i64>, WorkerId) {
    let mut builder = GraphBuilder::new();
    let id = builder.add_filter(name, body);
    builder.attach_input(id, Box::new(input.clone())).unwrap();
    builder.attach_output(id, Box::new(output.clone())).unwrap();
    (Interpreter::for_graph(builder.build().unwrap()).unwrap(), id)
}

#[test]
fn test_sections_run_on_their_own_threads() {
    common::init_tracing();
    let feed = SynchronizedChannel::new();
    let between = SynchronizedChannel::new();
    let out = SynchronizedChannel::new();

    let (mut upper, doubler) = section("double", Multiplier(2), &feed, &between);
    let (mut lower, summer) = section("pairs", PairwiseSum, &between, &out);

    let producer = {
        let feed = feed.clone();
        thread::spawn(move || {
            for x in 1..=100 {
                feed.offer(x);
            }
        })
    };
    let upper_thread = thread::spawn(move || {
        while upper.graph().executions(doubler).unwrap_or(0) < 100 {
            upper.interpret().unwrap();
            thread::yield_now();
        }
        upper
    });
    let lower_thread = thread::spawn(move || {
        while lower.graph().executions(summer).unwrap_or(0) < 50 {
            lower.interpret().unwrap();
            thread::yield_now();
        }
        lower
    });

    producer.join().unwrap();
    let upper = upper_thread.join().unwrap();
    let lower = lower_thread.join().unwrap();

    let results: Vec<i64> = std::iter::from_fn(|| out.try_pop()).collect();
    let expected: Vec<i64> = (0..50).map(|k| 2 * (4 * k + 3)).collect();
    assert_eq!(results, expected);
    assert_eq!(upper.stats().firings, 100);
    assert_eq!(lower.stats().firings, 50);
    assert_eq!(between.try_pop(), None);
}

#[test]
fn test_boundary_is_shared_with_the_caller() {
    let feed = SynchronizedChannel::new();
    let out = SynchronizedChannel::new();
    let (mut interpreter, _) = section("pairs", PairwiseSum, &feed, &out);

    feed.offer(1);
    assert!(!interpreter.interpret().unwrap());
    assert_eq!(out.try_pop(), None);

    feed.offer(2);
    assert!(interpreter.interpret().unwrap());
    assert_eq!(out.try_pop(), Some(3));
}

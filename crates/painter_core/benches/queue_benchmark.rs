//! Benchmark for the operation queue and execution loop.
//!
//! Run with: cargo bench --package painter_core --bench queue_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use painter_core::{
    ExecutionLoop, FillOperation, FnPresenter, Frame, OperationQueue, UpdateOperation,
};
use std::sync::Arc;
use std::thread;

fn benchmark_push_pop(c: &mut Criterion) {
    let queue = OperationQueue::new();

    c.bench_function("queue_push_pop_single_thread", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = i.wrapping_add(1);
            queue.push(black_box(i));
            black_box(queue.pop())
        });
    });
}

fn benchmark_contended_push(c: &mut Criterion) {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 10_000;

    let mut group = c.benchmark_group("contended_push");
    group.throughput(Throughput::Elements((PRODUCERS * PER_PRODUCER) as u64));

    group.bench_function("4_producers_1_consumer", |b| {
        b.iter(|| {
            let queue = Arc::new(OperationQueue::new());
            let producers: Vec<_> = (0..PRODUCERS)
                .map(|p| {
                    let queue = Arc::clone(&queue);
                    thread::spawn(move || {
                        for i in 0..PER_PRODUCER {
                            queue.push((p, i));
                        }
                    })
                })
                .collect();

            for _ in 0..PRODUCERS * PER_PRODUCER {
                black_box(queue.pop());
            }
            for p in producers {
                p.join().unwrap();
            }
        });
    });

    group.finish();
}

fn benchmark_loop_throughput(c: &mut Criterion) {
    const OPS: usize = 10_000;

    let mut group = c.benchmark_group("execution_loop");
    group.throughput(Throughput::Elements(OPS as u64));

    group.bench_function("fill_batch_then_update", |b| {
        b.iter(|| {
            let mut lp = ExecutionLoop::start_with_frame(
                Frame::new(64, 64),
                FnPresenter(|frame: &Frame| {
                    black_box(frame.pixel(0, 0));
                }),
            )
            .unwrap();
            for i in 0..OPS {
                let op = if i % 2 == 0 {
                    FillOperation::white()
                } else {
                    FillOperation::green()
                };
                lp.post(op).unwrap();
            }
            lp.post(UpdateOperation).unwrap();
            black_box(lp.stop_and_wait().unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_push_pop,
    benchmark_contended_push,
    benchmark_loop_throughput
);
criterion_main!(benches);

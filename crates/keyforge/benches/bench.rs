use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use keyforge::{KeyGenerator, TronGenerator};
use std::{thread::scope, time::Instant};

// Number of keypairs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_KEYS: usize = 256;

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("tron/single");
    group.throughput(Throughput::Elements(TOTAL_KEYS as u64));

    group.bench_function(format!("elems/{TOTAL_KEYS}"), |b| {
        let generator = TronGenerator::new();
        b.iter(|| {
            for _ in 0..TOTAL_KEYS {
                black_box(generator.try_generate().unwrap());
            }
        });
    });

    group.finish();
}

fn bench_multi_thread(c: &mut Criterion) {
    for threads in [2, 4, 8] {
        let mut group = c.benchmark_group(format!("tron/threads/{threads}"));
        group.throughput(Throughput::Elements((TOTAL_KEYS * threads) as u64));

        group.bench_function(format!("elems/{}", TOTAL_KEYS * threads), |b| {
            let generator = TronGenerator::new();
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    scope(|s| {
                        for _ in 0..threads {
                            s.spawn(|| {
                                for _ in 0..TOTAL_KEYS {
                                    black_box(generator.try_generate().unwrap());
                                }
                            });
                        }
                    });
                }
                start.elapsed()
            });
        });

        group.finish();
    }
}

criterion_group!(benches, bench_single_thread, bench_multi_thread);
criterion_main!(benches);

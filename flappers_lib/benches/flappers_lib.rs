use std::cell::Cell;
use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use flappers_lib::arena::Arena;
use flappers_lib::controller::{AgentSeed, Controller, Features};
use flappers_lib::options::RunOptions;

/// Jumps whenever the gap's bottom edge gets close; keeps most of the flock
/// alive long enough for the bench to exercise collision testing.
struct Glider;

impl Controller for Glider {
    fn activate(&mut self, features: Features) -> f32 {
        if features.dist_gap_bottom < 60. {
            1.
        } else {
            0.
        }
    }
}

fn seeds(population: usize) -> Vec<AgentSeed> {
    (0..population)
        .map(|_| AgentSeed {
            controller: Box::new(Glider),
            fitness: Rc::new(Cell::new(0.)),
        })
        .collect()
}

fn benchmark_arena_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_update");

    for population in [10_usize, 100, 500] {
        let mut ro = RunOptions::default();
        ro.rng_seed = Some(42);

        group.bench_with_input(
            BenchmarkId::new("population", population),
            &population,
            |b, &population| {
                b.iter_batched(
                    || Arena::new(seeds(population), &ro),
                    |mut arena| {
                        for _ in 0..30 {
                            arena.update(&ro);
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_arena_update);
criterion_main!(benches);

//! Benchmarks for evaluating and breeding arena generations.
//!
//! A tournament generation is the hot path: n(n-1)/2 matches fanned out on
//! the rayon pool.

#![allow(missing_docs)]

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use genetics::arena::{ArenaConfig, ArenaFactory, ArenaPlayerConfig, ArenaPlayerFactory};
use genetics::{
    NaturalSelectionConfig, NaturalSelectionPopulationFactory, PopulationFactory,
    PopulationIteration, RoundTournamentIteration, SimpleIteration,
};

fn population_factory(
    arena: &ArenaConfig,
) -> NaturalSelectionPopulationFactory<ArenaPlayerFactory> {
    let players = ArenaPlayerFactory::new(arena, ArenaPlayerConfig::default());
    NaturalSelectionPopulationFactory::new(
        Arc::new(players),
        NaturalSelectionConfig::new(2, 4, 1, 1),
    )
}

fn bench_tournament_generation(c: &mut Criterion) {
    let arena = ArenaConfig::default();
    let factory = population_factory(&arena);
    let population = factory.create_initial_population();
    let iteration = RoundTournamentIteration::new(Arc::new(ArenaFactory::with_seed(arena, 42)));

    c.bench_function("tournament_generation_8", |b| {
        b.iter(|| black_box(iteration.run(black_box(&population))));
    });
}

fn bench_simple_generation(c: &mut Criterion) {
    let arena = ArenaConfig::default();
    let factory = population_factory(&arena);
    let population = factory.create_initial_population();
    let iteration = SimpleIteration::new(Arc::new(ArenaFactory::with_seed(arena, 42)));

    c.bench_function("simple_generation_8", |b| {
        b.iter(|| black_box(iteration.run(black_box(&population))));
    });
}

fn bench_breeding(c: &mut Criterion) {
    let arena = ArenaConfig::default();
    let factory = population_factory(&arena);
    let iteration = SimpleIteration::new(Arc::new(ArenaFactory::with_seed(arena, 42)));

    c.bench_function("breed_generation_8", |b| {
        b.iter_batched(
            || {
                let population = factory.create_initial_population();
                let result = iteration.run(&population);
                (population, result)
            },
            |(population, result)| {
                if let Ok(result) = result {
                    black_box(factory.create_next_population(&population, &result));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_tournament_generation,
    bench_simple_generation,
    bench_breeding
);
criterion_main!(benches);

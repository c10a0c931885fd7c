//! Benchmarks for move generation and training.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use checkers_qlearn::checkers::{Checkers, CheckersState, Colour, GeometricApproximator};
use checkers_qlearn::qlearn::{approximate, QConfig, QTrainer};

fn opening_moves_benchmark(c: &mut Criterion) {
    let state = CheckersState::new(Colour::Black);

    c.bench_function("opening_playable_moves", |b| {
        b.iter(|| black_box(&state).playable_moves())
    });
}

fn episode_benchmark(c: &mut Criterion) {
    let mut trainer = QTrainer::new(Checkers::new(), QConfig::default().with_seed(42));

    c.bench_function("single_episode", |b| {
        b.iter(|| black_box(trainer.run_episode().map(|e| e.plies)))
    });
}

fn approximate_benchmark(c: &mut Criterion) {
    let mut trainer = QTrainer::new(Checkers::new(), QConfig::default().with_seed(7));
    let _ = trainer.train(200);
    let state = CheckersState::new(Colour::White);
    let key = state.key();

    c.bench_function("approximate_after_200_episodes", |b| {
        b.iter(|| {
            approximate(
                trainer.store(),
                black_box(&key),
                state.playable_moves(),
                &GeometricApproximator,
            )
        })
    });
}

criterion_group!(benches, opening_moves_benchmark, episode_benchmark, approximate_benchmark);
criterion_main!(benches);

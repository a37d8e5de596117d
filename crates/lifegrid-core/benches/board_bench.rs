use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use lifegrid_core::{Board, BoardConfig, BoardSize};
use std::time::Duration;

fn bench_board_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("board_step");
    group.sample_size(30);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(8));

    let steps: usize = std::env::var("LIFEGRID_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(64);

    for size in BoardSize::ALL {
        group.bench_function(format!("steps{steps}_{size}"), |b| {
            b.iter_batched(
                || {
                    let config = BoardConfig {
                        rng_seed: Some(0xBEEF),
                        ..BoardConfig::for_size(size)
                    };
                    let mut board = Board::with_config(config).expect("board");
                    board.initialize_soup(0.35).expect("soup");
                    board
                },
                |mut board| {
                    for _ in 0..steps {
                        board.step().expect("step");
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_board_steps);
criterion_main!(benches);

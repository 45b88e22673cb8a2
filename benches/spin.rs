use criterion::{black_box, criterion_group, criterion_main, Criterion};

use snow_kingdom::core::rng::DeterministicRng;
use snow_kingdom::game::config::GameConfig;
use snow_kingdom::game::evaluate::{evaluate, spin};
use snow_kingdom::game::grid::generate_grid;
use snow_kingdom::game::loader::{SNOW_KINGDOM_ID, SNOW_KINGDOM_JSON};

/// Grid generation and evaluation on the built-in game.
fn benchmark_spin(c: &mut Criterion) {
    let mut group = c.benchmark_group("spin");

    let config = GameConfig::from_json(SNOW_KINGDOM_ID, SNOW_KINGDOM_JSON)
        .expect("built-in game is valid");

    group.bench_function("generate_grid", |b| {
        let mut rng = DeterministicRng::new(1);
        b.iter(|| black_box(generate_grid(&config, &mut rng)))
    });

    group.bench_function("evaluate", |b| {
        let grid = generate_grid(&config, &mut DeterministicRng::new(2));
        b.iter(|| black_box(evaluate(black_box(&grid), 1, &config)))
    });

    group.bench_function("spin", |b| {
        let mut rng = DeterministicRng::new(3);
        b.iter(|| black_box(spin(&config, black_box(2), &mut rng)))
    });

    group.finish();
}

/// Config validation, paid once per game id.
fn benchmark_config(c: &mut Criterion) {
    c.bench_function("config_from_json", |b| {
        b.iter(|| black_box(GameConfig::from_json(SNOW_KINGDOM_ID, black_box(SNOW_KINGDOM_JSON))))
    });
}

criterion_group!(benches, benchmark_spin, benchmark_config);
criterion_main!(benches);

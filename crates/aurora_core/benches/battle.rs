//! Battle benchmarks for aurora_core.
//!
//! Run with: `cargo bench -p aurora_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use aurora_core::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// One full turn cycle: both players act, then the enemy and effect cascade.
fn turn_cycle(state: &BattleState, rng: &mut SeededRng) -> BattleState {
    let state = dispatch(
        state,
        ActorRole::Player1,
        ActionKind::Attack,
        "Data Breach",
        rng,
    );
    dispatch(&state, ActorRole::Player2, ActionKind::Defend, "Firewall", rng)
}

pub fn battle_benchmark(c: &mut Criterion) {
    let start = create_battle("Ada", "Bo");

    c.bench_function("turn_cycle", |b| {
        let mut rng = SeededRng::new(42);
        b.iter(|| turn_cycle(black_box(&start), &mut rng));
    });

    c.bench_function("seeded_round", |b| {
        b.iter(|| {
            let mut battle = Battle::seeded("Ada", "Bo", black_box(7));
            while battle.state().phase == Phase::Battle {
                battle.dispatch(ActorRole::Player1, ActionKind::Attack, "Data Breach");
                battle.dispatch(ActorRole::Player2, ActionKind::Defend, "Firewall");
            }
            battle.state().state_hash()
        });
    });
}

criterion_group!(benches, battle_benchmark);
criterion_main!(benches);

//! Fleet tick benchmark: one frame for a fleet of mixed hulls under modifiers.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use cosmicshore_core::prelude::*;
use cosmicshore_logic::input::TickInput;
use cosmicshore_logic::motion::Pose;
use cosmicshore_logic::tuning::ShipClass;
use glam::Vec3;

fn setup_fleet(n: usize) -> FleetEngine {
    let mut engine = FleetEngine::new();
    for i in 0..n {
        let class = ShipClass::ALL[i % ShipClass::ALL.len()];
        let position = Vec3::new((i as f32 * 1.7) % 500.0, (i as f32 * 2.3) % 500.0, 0.0);
        let pose = Pose::new(position, Default::default());
        let ship = engine.spawn_class(&format!("ship-{i}"), class, pose);
        let input = TickInput {
            yaw: ((i % 7) as f32 - 3.0) / 3.0,
            throttle: Some((i % 5) as f32 / 4.0),
            ..TickInput::new(0.0)
        };
        engine.set_input(ship, input).expect("spawned ship");
        engine
            .set_homing_target(ship, Some(Vec3::ZERO))
            .expect("spawned ship");
        engine
            .add_throttle_modifier(ship, 0.5 + (i % 4) as f32, 2.0)
            .expect("positive duration");
        engine
            .add_velocity_modifier(ship, Vec3::X * (i % 3) as f32, 1.0)
            .expect("positive duration");
    }
    engine
}

fn bench_fleet_tick(c: &mut Criterion) {
    let dt = 1.0 / 60.0;

    for n in [100, 1_000] {
        c.bench_function(&format!("fleet_tick_{n}"), |b| {
            b.iter_batched(
                || setup_fleet(n),
                |mut engine| {
                    engine.update(dt);
                    engine
                },
                BatchSize::LargeInput,
            )
        });
    }
}

criterion_group!(benches, bench_fleet_tick);
criterion_main!(benches);

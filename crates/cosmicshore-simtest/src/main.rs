//! Cosmic Shore Headless Flight Harness
//!
//! Validates flight logic, class presets and the fleet engine without a
//! game engine. Runs entirely in-process, no rendering and no input devices.
//!
//! Usage:
//!   cargo run -p cosmicshore-simtest
//!   cargo run -p cosmicshore-simtest -- --verbose
//!   cargo run -p cosmicshore-simtest -- --seed 1234

use cosmicshore_core::prelude::*;
use cosmicshore_logic::constants::modifiers::SPEED_MODIFIER_DURATION;
use cosmicshore_logic::damping;
use cosmicshore_logic::input::{ButtonPhase, ControlEvent, StraightFlightDetector, TickInput};
use cosmicshore_logic::modifiers::{ModifierStack, ThrottleComposer, VelocityComposer};
use cosmicshore_logic::motion::{self, Pose};
use cosmicshore_logic::throttle::{self, Boost};
use cosmicshore_logic::tuning::{validate_tuning, ShipClass, ShipTuning};
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

// ── Ship presets (data-driven hull tuning) ──────────────────────────────
const PRESETS_JSON: &str = include_str!("../../../data/ship_presets.json");

#[derive(Debug, Deserialize)]
struct PresetSpec {
    class_name: String,
    tuning: ShipTuning,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    println!("=== Cosmic Shore Flight Harness (seed {}) ===\n", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut results = Vec::new();

    // 1. Preset file validation
    results.extend(validate_presets(verbose));

    // 2. Modifier composition sweep
    results.extend(validate_modifiers(&mut rng));

    // 3. Damped approach sweep
    results.extend(validate_approach(&mut rng));

    // 4. Throttle model
    results.extend(validate_throttle());

    // 5. Motion integration
    results.extend(validate_motion(&mut rng));

    // 6. Straight-flight detection
    results.extend(validate_straight_flight());

    // 7. Fleet engine
    results.extend(validate_fleet(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();
    log::info!("{} checks run", total);

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Presets ──────────────────────────────────────────────────────────

fn validate_presets(verbose: bool) -> Vec<TestResult> {
    println!("--- Ship Presets ---");
    let mut results = Vec::new();

    let presets: Vec<PresetSpec> = match serde_json::from_str(PRESETS_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "presets_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "presets_cover_all_classes".into(),
        passed: ShipClass::ALL
            .iter()
            .all(|c| presets.iter().any(|p| ShipClass::from_name(&p.class_name) == Some(*c))),
        detail: format!("{} presets loaded", presets.len()),
    });

    let unknown: Vec<_> = presets
        .iter()
        .filter(|p| ShipClass::from_name(&p.class_name).is_none())
        .map(|p| p.class_name.as_str())
        .collect();
    results.push(TestResult {
        name: "presets_known_classes".into(),
        passed: unknown.is_empty(),
        detail: if unknown.is_empty() {
            "every preset names a known class".into()
        } else {
            format!("unknown classes: {}", unknown.join(", "))
        },
    });

    for preset in &presets {
        let errors = validate_tuning(&preset.tuning);
        results.push(TestResult {
            name: format!("preset_valid_{}", preset.class_name.to_lowercase()),
            passed: errors.is_empty(),
            detail: if errors.is_empty() {
                "tuning valid".into()
            } else {
                format!("{:?}", errors)
            },
        });

        if let Some(class) = ShipClass::from_name(&preset.class_name) {
            let matches = class.tuning() == preset.tuning;
            results.push(TestResult {
                name: format!("preset_matches_builtin_{}", class.name().to_lowercase()),
                passed: matches,
                detail: if matches {
                    "file and built-in tuning agree".into()
                } else {
                    format!("file {:?} vs built-in {:?}", preset.tuning, class.tuning())
                },
            });
        }

        if verbose {
            let t = &preset.tuning;
            println!(
                "    {:9} min={:5.1} scaler={:5.1} boost={:3.1} rule={:?} mode={:?}",
                preset.class_name,
                t.minimum_speed,
                t.throttle_scaler,
                t.boost_multiplier,
                t.composition_rule,
                t.movement_mode
            );
        }
    }

    results
}

// ── 2. Modifiers ────────────────────────────────────────────────────────

fn validate_modifiers(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Modifier Composition ---");
    let mut results = Vec::new();
    let composer = ThrottleComposer::default();

    // Two debuffs compose multiplicatively, then decay away.
    let mut stack = ModifierStack::<f32>::new();
    let setup = stack.add(0.5, 1.0).and_then(|_| stack.add(0.8, 1.0));
    let at_start = stack.tick(0.0, &composer);
    let at_end = stack.tick(1.0, &composer);
    results.push(match setup {
        Ok(()) => TestResult {
            name: "modifier_debuffs_compose".into(),
            passed: (at_start - 0.4).abs() < 1e-5
                && (at_end - 1.0).abs() < 1e-6
                && stack.is_empty(),
            detail: format!("t=0 → {:.4}, t=1 → {:.4}", at_start, at_end),
        },
        Err(e) => TestResult {
            name: "modifier_debuffs_compose".into(),
            passed: false,
            detail: format!("setup failed: {}", e),
        },
    });

    // Velocity shift decays linearly to zero.
    let mut shifts = ModifierStack::<Vec3>::new();
    let setup = shifts.add(Vec3::new(10.0, 0.0, 0.0), 2.0);
    let half = shifts.tick(1.0, &VelocityComposer::default());
    let gone = shifts.tick(1.0, &VelocityComposer::default());
    results.push(match setup {
        Ok(()) => TestResult {
            name: "modifier_velocity_decay".into(),
            passed: (half - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5
                && gone == Vec3::ZERO
                && shifts.is_empty(),
            detail: format!("t=1 → {:?}, t=2 → {:?}", half, gone),
        },
        Err(e) => TestResult {
            name: "modifier_velocity_decay".into(),
            passed: false,
            detail: format!("setup failed: {}", e),
        },
    });

    // Random injection: output stays in range, count only drops at expiry.
    let mut stack = ModifierStack::<f32>::new();
    let mut out_of_range = 0;
    let mut count_grew = 0;
    let mut rejected = 0;
    let ticks = 10_000;
    for _ in 0..ticks {
        if rng.gen_bool(0.2)
            && stack
                .add(rng.gen_range(0.0..10.0), rng.gen_range(0.05..4.0))
                .is_err()
        {
            rejected += 1;
        }
        let before = stack.len();
        let m = stack.tick(rng.gen_range(0.0..0.1), &composer);
        if !(0.0..=composer.ceiling).contains(&m) {
            out_of_range += 1;
        }
        if stack.len() > before {
            count_grew += 1;
        }
    }
    results.push(TestResult {
        name: "modifier_random_injection".into(),
        passed: rejected == 0,
        detail: format!("{} valid modifiers rejected", rejected),
    });
    results.push(TestResult {
        name: "modifier_random_range".into(),
        passed: out_of_range == 0,
        detail: format!("{} of {} ticks out of [0, {}]", out_of_range, ticks, composer.ceiling),
    });
    results.push(TestResult {
        name: "modifier_count_monotone".into(),
        passed: count_grew == 0,
        detail: format!("{} ticks grew the stack", count_grew),
    });

    results.push(TestResult {
        name: "modifier_rejects_bad_duration".into(),
        passed: stack.add(1.0, 0.0).is_err()
            && stack.add(1.0, -1.0).is_err()
            && stack.add(1.0, f32::NAN).is_err(),
        detail: "zero, negative and NaN durations rejected".into(),
    });

    results
}

// ── 3. Damped approach ──────────────────────────────────────────────────

fn validate_approach(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Damped Approach ---");
    let mut results = Vec::new();

    let mut overshoots = 0;
    let mut reversals = 0;
    let trials = 500;
    for _ in 0..trials {
        let rate = rng.gen_range(0.1..10.0);
        let dt = rng.gen_range(0.001..0.5);
        let target = rng.gen_range(-100.0..100.0);
        let mut v: f32 = rng.gen_range(-100.0..100.0);
        let mut gap = (target - v).abs();
        let side = (target - v).signum();
        for _ in 0..200 {
            v = damping::approach_scalar(v, target, rate, dt);
            let new_gap = (target - v).abs();
            if (target - v) * side < 0.0 {
                overshoots += 1;
            }
            if new_gap > gap {
                reversals += 1;
            }
            gap = new_gap;
        }
    }
    results.push(TestResult {
        name: "approach_no_overshoot".into(),
        passed: overshoots == 0,
        detail: format!("{} overshoots in {} trials", overshoots, trials),
    });
    results.push(TestResult {
        name: "approach_monotone".into(),
        passed: reversals == 0,
        detail: format!("{} gap increases in {} trials", reversals, trials),
    });

    let target = Quat::from_axis_angle(Vec3::Y, 2.0);
    let mut q = Quat::IDENTITY;
    let mut prev = q.angle_between(target);
    let mut monotone = true;
    for _ in 0..300 {
        q = damping::approach_rotation(q, target, 2.0, 1.0 / 60.0);
        let gap = q.angle_between(target);
        monotone &= gap <= prev + 1e-3;
        prev = gap;
    }
    results.push(TestResult {
        name: "approach_rotation_converges".into(),
        passed: monotone && prev < 0.01,
        detail: format!("final gap {:.5} rad", prev),
    });

    results
}

// ── 4. Throttle ─────────────────────────────────────────────────────────

fn validate_throttle() -> Vec<TestResult> {
    println!("--- Throttle Model ---");
    let mut results = Vec::new();

    let target = throttle::compute_target_speed(1.0, 10.0, 50.0, Boost::NONE);
    results.push(TestResult {
        name: "throttle_target_speed".into(),
        passed: target == 60.0,
        detail: format!("full throttle → {}", target),
    });

    let lost = throttle::step_speed(80.0, None, 3.0, 2.0, 0.016);
    results.push(TestResult {
        name: "throttle_lost_input_zero".into(),
        passed: lost == 0.0,
        detail: format!("no throttle → {}", lost),
    });

    let boosted = throttle::compute_target_speed(
        1.0,
        10.0,
        50.0,
        Boost {
            active: true,
            multiplier: 4.0,
            charge: None,
        },
    );
    results.push(TestResult {
        name: "throttle_boost".into(),
        passed: boosted == 210.0,
        detail: format!("boosted full throttle → {}", boosted),
    });

    results
}

// ── 5. Motion ───────────────────────────────────────────────────────────

fn validate_motion(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Motion Integration ---");
    let mut results = Vec::new();

    let mut changed = 0;
    let trials = 1_000;
    for _ in 0..trials {
        let pose = Pose::new(
            Vec3::new(
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
            ),
            Quat::from_axis_angle(Vec3::Y, rng.gen_range(-3.0..3.0)),
        );
        let course = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 1.0);
        let shift = Vec3::new(rng.gen_range(-50.0..50.0), 0.0, rng.gen_range(-50.0..50.0));
        let step = motion::advance(&pose, rng.gen_range(0.0..200.0), course, shift, 0.0);
        if step.pose != pose {
            changed += 1;
        }
    }
    results.push(TestResult {
        name: "motion_zero_dt_identity".into(),
        passed: changed == 0,
        detail: format!("{} of {} poses moved with dt=0", changed, trials),
    });

    let step = motion::advance(&Pose::default(), 50.0, Vec3::ZERO, Vec3::X, 1.0);
    results.push(TestResult {
        name: "motion_degenerate_course".into(),
        passed: step.degenerate.is_some() && !step.pose.position.is_nan(),
        detail: format!("position {:?}", step.pose.position),
    });

    results
}

// ── 6. Straight flight ──────────────────────────────────────────────────

fn validate_straight_flight() -> Vec<TestResult> {
    println!("--- Straight-Flight Detection ---");
    let mut results = Vec::new();
    let mut detector = StraightFlightDetector::new();

    let axes = |yaw: f32, throttle: f32| TickInput {
        yaw,
        throttle: Some(throttle),
        ..TickInput::new(1.0 / 60.0)
    };

    let press = detector.update(&axes(0.0, 1.0));
    let hold = detector.update(&axes(0.1, 0.95));
    let release = detector.update(&axes(0.9, 0.95));
    results.push(TestResult {
        name: "straight_full_speed_cycle".into(),
        passed: press == vec![(ControlEvent::FullSpeedStraight, ButtonPhase::Pressed)]
            && hold.is_empty()
            && release == vec![(ControlEvent::FullSpeedStraight, ButtonPhase::Released)],
        detail: format!("press={:?} hold={:?} release={:?}", press, hold, release),
    });

    results
}

// ── 7. Fleet ────────────────────────────────────────────────────────────

fn validate_fleet(verbose: bool) -> Vec<TestResult> {
    println!("--- Fleet Engine ---");
    let mut results = Vec::new();
    let mut engine = FleetEngine::new();
    let mut setup_errors = Vec::new();

    let ships: Vec<_> = ShipClass::ALL
        .iter()
        .enumerate()
        .map(|(i, class)| {
            let spawn = Pose::new(Vec3::new(i as f32 * 20.0, 0.0, 0.0), Quat::IDENTITY);
            let ship = engine.spawn_class(class.name(), *class, spawn);
            let input = TickInput {
                throttle: Some(1.0),
                yaw: 0.2,
                ..TickInput::new(0.0)
            };
            let target = Some(spawn.position + Vec3::Z * 100.0);
            if let Err(e) = engine
                .set_input(ship, input)
                .and_then(|_| engine.set_homing_target(ship, target))
            {
                setup_errors.push(format!("{}: {}", class.name(), e));
            }
            (*class, ship, spawn)
        })
        .collect();

    results.push(TestResult {
        name: "fleet_spawn".into(),
        passed: engine.ship_count() == ShipClass::ALL.len(),
        detail: format!("{} ships spawned", engine.ship_count()),
    });

    let (_, slowed_ship, _) = ships[0];
    if let Err(e) = engine.add_throttle_modifier(slowed_ship, 0.5, SPEED_MODIFIER_DURATION) {
        setup_errors.push(format!("slow {}: {}", ShipClass::ALL[0].name(), e));
    }
    results.push(TestResult {
        name: "fleet_setup".into(),
        passed: setup_errors.is_empty(),
        detail: if setup_errors.is_empty() {
            "inputs, targets and modifiers applied".into()
        } else {
            setup_errors.join("; ")
        },
    });

    for _ in 0..60 {
        engine.update(1.0 / 60.0);
    }
    results.push(TestResult {
        name: "fleet_slowed_registry".into(),
        passed: engine.slowed_ships() == vec![slowed_ship],
        detail: format!("{} slowed after 1s", engine.slowed_ships().len()),
    });

    for _ in 0..540 {
        engine.update(1.0 / 60.0);
    }
    results.push(TestResult {
        name: "fleet_slowed_expired".into(),
        passed: engine.slowed_ships().is_empty(),
        detail: format!("{} slowed after 10s", engine.slowed_ships().len()),
    });

    for (class, ship, spawn) in &ships {
        let pose = engine.pose_of(*ship).unwrap_or(*spawn);
        let moved = (pose.position - spawn.position).length();
        let finite = pose.position.is_finite() && pose.orientation.is_finite();
        if verbose {
            let speed = engine.state_of(*ship).map_or(0.0, |s| s.speed);
            println!(
                "    {:9} moved {:8.1} speed {:6.1}",
                class.name(),
                moved,
                speed
            );
        }
        results.push(TestResult {
            name: format!("fleet_flies_{}", class.name().to_lowercase()),
            passed: finite && moved > 0.0,
            detail: format!("moved {:.1} in 10s", moved),
        });
    }

    results.push(TestResult {
        name: "fleet_sim_time".into(),
        passed: (engine.sim_time() - 10.0).abs() < 1e-3,
        detail: format!("{:.4}s simulated", engine.sim_time()),
    });

    results
}

//! Per-ship flight pipeline, shared by every hull.
//!
//! [`ShipKinematics`] owns a ship's pose, kinematic state and modifier
//! stacks, and runs the tick pipeline in a fixed order:
//!
//! 1. Orientation: integrate axes, damp toward the target, derive the course
//! 2. Modifiers: advance both stacks, compose multiplier and velocity shift
//! 3. Throttle: target speed → damped speed → × multiplier
//! 4. Motion: advance position along the course plus the velocity shift
//!
//! Gameplay systems inject modifiers between ticks. Side effects (a ship
//! becoming slowed, a degenerate course) go to the [`EffectSink`] passed
//! into each tick.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::TickInput;
use crate::modifiers::{InvalidModifierError, ModifierStack};
use crate::motion::{advance, advance_toward, try_direction, DegenerateDirectionWarning, Pose};
use crate::orientation::{look_rotation, OrientationIntegrator, OrientationMode};
use crate::throttle::{compute_target_speed, step_speed, Boost, ChargedBoost};
use crate::tuning::{MovementMode, ShipTuning};

/// Receives side effects of a ship's tick.
pub trait EffectSink {
    /// The ship gained its first active debuff (`true`) or lost its last (`false`).
    fn slowed_changed(&mut self, slowed: bool);

    /// A course or homing direction was too short to use this tick.
    fn degenerate_course(&mut self, _warning: DegenerateDirectionWarning) {}
}

/// Discards every effect.
impl EffectSink for () {
    fn slowed_changed(&mut self, _slowed: bool) {}
}

/// Everything about a ship's motion except its pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// Always >= 0.
    pub speed: f32,
    /// Unit direction of travel.
    pub course: Vec3,
    /// Composed throttle modifier, in `[0, speed_modifier_max]`.
    pub throttle_multiplier: f32,
    /// Composed velocity modifier.
    pub velocity_shift: Vec3,
    pub minimum_speed: f32,
    pub throttle_scaler: f32,
    pub drifting: bool,
    pub slowed: bool,
}

/// What the renderer reads after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    pub pose: Pose,
    pub state: KinematicState,
}

#[derive(Debug, Clone)]
pub struct ShipKinematics {
    tuning: ShipTuning,
    position: Vec3,
    orientation: OrientationIntegrator,
    state: KinematicState,
    throttle_modifiers: ModifierStack<f32>,
    velocity_modifiers: ModifierStack<Vec3>,
    charged_boost: ChargedBoost,
    homing_target: Option<Vec3>,
}

impl ShipKinematics {
    pub fn new(tuning: ShipTuning, spawn: Pose) -> Self {
        let orientation = OrientationIntegrator::new(spawn.orientation);
        let state = KinematicState {
            speed: tuning.initial_speed,
            course: orientation.forward(),
            throttle_multiplier: 1.0,
            velocity_shift: Vec3::ZERO,
            minimum_speed: tuning.minimum_speed,
            throttle_scaler: tuning.throttle_scaler,
            drifting: false,
            slowed: false,
        };
        Self {
            tuning,
            position: spawn.position,
            orientation,
            state,
            throttle_modifiers: ModifierStack::new(),
            velocity_modifiers: ModifierStack::new(),
            charged_boost: ChargedBoost::default(),
            homing_target: None,
        }
    }

    pub fn tuning(&self) -> &ShipTuning {
        &self.tuning
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation.current())
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    pub fn orientation(&self) -> &OrientationIntegrator {
        &self.orientation
    }

    /// For spins and scripted rotations between ticks.
    pub fn orientation_mut(&mut self) -> &mut OrientationIntegrator {
        &mut self.orientation
    }

    pub fn charged_boost(&self) -> &ChargedBoost {
        &self.charged_boost
    }

    pub fn throttle_modifier_count(&self) -> usize {
        self.throttle_modifiers.len()
    }

    pub fn velocity_modifier_count(&self) -> usize {
        self.velocity_modifiers.len()
    }

    pub fn is_slowed(&self) -> bool {
        self.state.slowed
    }

    pub fn homing_target(&self) -> Option<Vec3> {
        self.homing_target
    }

    pub fn set_homing_target(&mut self, target: Option<Vec3>) {
        self.homing_target = target;
    }

    pub fn set_minimum_speed(&mut self, minimum_speed: f32) {
        self.state.minimum_speed = minimum_speed.max(0.0);
    }

    pub fn set_throttle_scaler(&mut self, throttle_scaler: f32) {
        self.state.throttle_scaler = throttle_scaler.max(0.0);
    }

    /// Place the ship without touching its motion state.
    pub fn teleport(&mut self, pose: Pose) {
        self.position = pose.position;
        self.orientation.set_orientation(pose.orientation);
        if !self.state.drifting {
            self.state.course = self.orientation.forward();
        }
    }

    /// Queue a throttle multiplier that decays to 1.0 over `duration` seconds.
    pub fn add_throttle_modifier(
        &mut self,
        value: f32,
        duration: f32,
    ) -> Result<(), InvalidModifierError> {
        self.throttle_modifiers.add(value, duration)?;
        log::debug!("throttle modifier {} for {}s", value, duration);
        Ok(())
    }

    /// Queue a velocity shift that decays to zero over `duration` seconds.
    pub fn add_velocity_modifier(
        &mut self,
        value: Vec3,
        duration: f32,
    ) -> Result<(), InvalidModifierError> {
        self.velocity_modifiers.add(value, duration)?;
        log::debug!("velocity modifier {:?} for {}s", value, duration);
        Ok(())
    }

    /// Drop every modifier and restore the tuned defaults.
    ///
    /// Position and orientation are kept; the orientation target is
    /// re-anchored at the current orientation.
    pub fn reset(&mut self, sink: &mut dyn EffectSink) {
        let was_slowed = self.state.slowed;

        self.throttle_modifiers.clear();
        self.velocity_modifiers.clear();
        self.charged_boost.reset();
        self.homing_target = None;
        self.orientation.release();
        self.orientation.reset_target();
        self.state = KinematicState {
            speed: self.tuning.initial_speed,
            course: self.orientation.forward(),
            throttle_multiplier: 1.0,
            velocity_shift: Vec3::ZERO,
            minimum_speed: self.tuning.minimum_speed,
            throttle_scaler: self.tuning.throttle_scaler,
            drifting: false,
            slowed: false,
        };

        if was_slowed {
            sink.slowed_changed(false);
        }
        log::debug!("ship kinematics reset");
    }

    /// Run one tick of the flight pipeline.
    pub fn tick(&mut self, input: &TickInput, sink: &mut dyn EffectSink) -> TickOutput {
        let input = input.sanitized();
        match self.tuning.movement_mode {
            MovementMode::FreeFlight => self.tick_free_flight(&input, sink),
            MovementMode::Homing => self.tick_homing(&input, sink),
        }
        TickOutput {
            pose: self.pose(),
            state: self.state,
        }
    }

    fn tick_free_flight(&mut self, input: &TickInput, sink: &mut dyn EffectSink) {
        let dt = input.delta_time;

        // 1. Orientation and course
        self.orientation.accumulate_axes(
            input.pitch,
            input.yaw,
            input.roll,
            dt,
            &self.tuning.axis_scalers,
            self.state.speed,
        );
        let gyro = input.gyro_enabled.then_some(input.gyro_rotation);
        self.orientation.settle(self.tuning.orientation_damping, dt, gyro);
        self.update_course(input, sink);

        // 2. Modifiers
        self.tick_modifiers(dt, sink);

        // 3. Throttle
        let charge = self.tick_charged_boost(input, dt);
        let target = input.throttle.map(|axis| {
            compute_target_speed(
                axis,
                self.state.minimum_speed,
                self.state.throttle_scaler,
                Boost {
                    active: input.boosting,
                    multiplier: self.tuning.boost_multiplier,
                    charge,
                },
            )
        });
        self.state.speed = step_speed(
            self.state.speed,
            target,
            self.state.throttle_multiplier,
            self.tuning.speed_damping,
            dt,
        );
        if target.is_none() {
            // Input lost: hold position rather than coast.
            return;
        }

        // 4. Motion
        let step = advance(
            &self.pose(),
            self.state.speed,
            self.state.course,
            self.state.velocity_shift,
            dt,
        );
        if let Some(warning) = step.degenerate {
            sink.degenerate_course(warning);
        }
        self.position = step.pose.position;
    }

    fn tick_homing(&mut self, input: &TickInput, sink: &mut dyn EffectSink) {
        let dt = input.delta_time;

        // 1. Orientation follows the course, screen-back as up.
        if let Some(look) = look_rotation(self.state.course, Vec3::NEG_Z) {
            self.orientation.force_target(look);
        }
        self.orientation.settle(self.tuning.orientation_damping, dt, None);

        // 2. Modifiers
        self.tick_modifiers(dt, sink);

        // 3. Homing rate
        self.state.speed = match input.throttle {
            None => 0.0,
            Some(_) => (self.tuning.initial_speed * self.state.throttle_multiplier).max(0.0),
        };
        if input.throttle.is_none() {
            return;
        }

        // 4. Motion
        if let Some(target) = self.homing_target {
            let step = advance_toward(self.position, target, self.state.speed, dt);
            self.position = step.position;
            match step.course {
                Ok(course) => self.state.course = course,
                Err(warning) => sink.degenerate_course(warning),
            }
        }
        self.position += self.state.velocity_shift * dt;
    }

    fn update_course(&mut self, input: &TickInput, sink: &mut dyn EffectSink) {
        if !input.drifting {
            self.state.course = self.orientation.forward();
        } else if let Some(course) = input.drift_course {
            match try_direction(course) {
                Ok(dir) => self.state.course = dir,
                Err(warning) => {
                    log::warn!("drift course: {}", warning);
                    sink.degenerate_course(warning);
                }
            }
        }
        if input.drifting != self.state.drifting {
            log::debug!("drifting: {}", input.drifting);
        }
        self.state.drifting = input.drifting;
    }

    fn tick_modifiers(&mut self, dt: f32, sink: &mut dyn EffectSink) {
        self.state.throttle_multiplier = self
            .throttle_modifiers
            .tick(dt, &self.tuning.throttle_composer());
        self.state.velocity_shift = self
            .velocity_modifiers
            .tick(dt, &self.tuning.velocity_composer());

        let slowed = self.throttle_modifiers.has_debuff();
        if slowed != self.state.slowed {
            self.state.slowed = slowed;
            sink.slowed_changed(slowed);
        }
    }

    fn tick_charged_boost(&mut self, input: &TickInput, dt: f32) -> Option<f32> {
        let tuning = self.tuning.charged_boost;
        if input.charging_boost {
            self.charged_boost.accumulate(&tuning, dt);
        }
        if input.charged_boost_discharging {
            self.charged_boost.begin_discharge();
        }
        self.charged_boost.discharge(&tuning, dt)
    }

    /// Whether the orientation target is currently owned externally.
    pub fn is_orientation_forced(&self) -> bool {
        self.orientation.mode() == OrientationMode::Forced
    }

    /// Face the current course immediately.
    pub fn face_course(&mut self) {
        self.orientation.snap_to(self.state.course);
    }

    /// Orientation reported to the renderer. Same as [`Self::pose`]'s.
    pub fn orientation_quat(&self) -> Quat {
        self.orientation.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::ShipClass;

    #[derive(Default)]
    struct Recorder {
        slowed: Vec<bool>,
        degenerate: usize,
    }

    impl EffectSink for Recorder {
        fn slowed_changed(&mut self, slowed: bool) {
            self.slowed.push(slowed);
        }
        fn degenerate_course(&mut self, _warning: DegenerateDirectionWarning) {
            self.degenerate += 1;
        }
    }

    const DT: f32 = 1.0 / 60.0;

    fn ship() -> ShipKinematics {
        ShipKinematics::new(ShipTuning::default(), Pose::default())
    }

    fn full_throttle() -> TickInput {
        TickInput {
            throttle: Some(1.0),
            ..TickInput::new(DT)
        }
    }

    fn run(ship: &mut ShipKinematics, input: &TickInput, ticks: usize) -> TickOutput {
        let mut out = ship.tick(input, &mut ());
        for _ in 1..ticks {
            out = ship.tick(input, &mut ());
        }
        out
    }

    #[test]
    fn test_full_throttle_converges_to_target_speed() {
        let mut s = ship();
        let out = run(&mut s, &full_throttle(), 600);
        assert!((out.state.speed - 60.0).abs() < 0.1, "speed={}", out.state.speed);
        assert!(out.pose.position.z > 0.0);
        assert!(out.pose.position.x.abs() < 1e-3);
        assert_eq!(out.state.course, Vec3::Z);
    }

    #[test]
    fn test_missing_throttle_zeroes_speed_and_holds_position() {
        let mut s = ship();
        run(&mut s, &full_throttle(), 120);
        s.add_throttle_modifier(3.0, 5.0).unwrap();
        s.add_velocity_modifier(Vec3::X * 20.0, 5.0).unwrap();
        let before = s.pose().position;

        let lost = TickInput {
            throttle: None,
            ..TickInput::new(DT)
        };
        let out = s.tick(&lost, &mut ());
        assert_eq!(out.state.speed, 0.0);
        assert_eq!(out.pose.position, before);
    }

    #[test]
    fn test_debuff_slows_and_notifies() {
        let mut s = ship();
        let mut clean = ship();
        let mut sink = Recorder::default();
        run(&mut s, &full_throttle(), 300);
        run(&mut clean, &full_throttle(), 300);

        s.add_throttle_modifier(0.5, 1.0).unwrap();
        for _ in 0..30 {
            s.tick(&full_throttle(), &mut sink);
            clean.tick(&full_throttle(), &mut ());
        }
        assert!(s.is_slowed());
        assert!(s.state().speed < clean.state().speed);
        assert_eq!(sink.slowed, vec![true]);

        for _ in 0..40 {
            s.tick(&full_throttle(), &mut sink);
        }
        assert!(!s.is_slowed());
        assert_eq!(s.throttle_modifier_count(), 0);
        assert_eq!(sink.slowed, vec![true, false]);
    }

    #[test]
    fn test_slowed_clears_on_final_tick_of_duration() {
        let mut s = ship();
        let mut sink = Recorder::default();
        s.add_throttle_modifier(0.5, 1.0).unwrap();

        for _ in 0..59 {
            s.tick(&full_throttle(), &mut sink);
        }
        assert!(s.is_slowed());
        assert_eq!(sink.slowed, vec![true]);

        s.tick(&full_throttle(), &mut sink);
        assert!(!s.is_slowed());
        assert_eq!(s.throttle_modifier_count(), 0);
        assert_eq!(sink.slowed, vec![true, false]);
    }

    #[test]
    fn test_multiplier_reported_in_range() {
        let mut s = ship();
        for _ in 0..4 {
            s.add_throttle_modifier(5.0, 2.0).unwrap();
        }
        let out = s.tick(&full_throttle(), &mut ());
        assert_eq!(out.state.throttle_multiplier, 6.0);
    }

    #[test]
    fn test_invalid_modifier_rejected() {
        let mut s = ship();
        assert!(s.add_throttle_modifier(0.5, 0.0).is_err());
        assert!(s.add_velocity_modifier(Vec3::X, -1.0).is_err());
        assert_eq!(s.throttle_modifier_count(), 0);
        assert_eq!(s.velocity_modifier_count(), 0);
    }

    #[test]
    fn test_velocity_modifier_nudges_sideways() {
        let mut s = ship();
        s.add_velocity_modifier(Vec3::new(30.0, 0.0, 0.0), 0.5).unwrap();
        let out = run(&mut s, &full_throttle(), 60);
        assert!(out.pose.position.x > 0.0);
        assert_eq!(s.velocity_modifier_count(), 0);
        assert_eq!(out.state.velocity_shift, Vec3::ZERO);
    }

    #[test]
    fn test_yaw_turns_course() {
        let mut s = ship();
        let turning = TickInput {
            yaw: 1.0,
            ..full_throttle()
        };
        let out = run(&mut s, &turning, 30);
        assert!(out.state.course.x > 0.1);
        assert!((out.state.course.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_drift_holds_course_while_turning() {
        let mut s = ship();
        run(&mut s, &full_throttle(), 10);
        let drifting = TickInput {
            yaw: 1.0,
            drifting: true,
            ..full_throttle()
        };
        let out = run(&mut s, &drifting, 60);
        assert!(out.state.drifting);
        assert!((out.state.course - Vec3::Z).length() < 1e-5);
        assert!(out.pose.forward().x > 0.1);

        let out = s.tick(&full_throttle(), &mut ());
        assert!(!out.state.drifting);
        assert!(out.state.course.x > 0.1);
    }

    #[test]
    fn test_drift_course_override() {
        let mut s = ship();
        let input = TickInput {
            drifting: true,
            drift_course: Some(Vec3::new(0.0, 2.0, 0.0)),
            ..full_throttle()
        };
        let out = s.tick(&input, &mut ());
        assert_eq!(out.state.course, Vec3::Y);

        let mut sink = Recorder::default();
        let bad = TickInput {
            drift_course: Some(Vec3::ZERO),
            ..input
        };
        let out = s.tick(&bad, &mut sink);
        assert_eq!(out.state.course, Vec3::Y);
        assert_eq!(sink.degenerate, 1);
    }

    #[test]
    fn test_boost_raises_speed() {
        let mut plain = ship();
        let mut boosted = ship();
        let boost = TickInput {
            boosting: true,
            ..full_throttle()
        };
        let a = run(&mut plain, &full_throttle(), 120);
        let b = run(&mut boosted, &boost, 120);
        assert!(b.state.speed > a.state.speed * 2.0);
    }

    #[test]
    fn test_charged_boost_discharges_over_ticks() {
        let mut s = ship();
        let charging = TickInput {
            charging_boost: true,
            ..full_throttle()
        };
        run(&mut s, &charging, 120);
        assert!(s.charged_boost().charge() > 1.0);

        let release = TickInput {
            charged_boost_discharging: true,
            ..full_throttle()
        };
        s.tick(&release, &mut ());
        assert!(s.charged_boost().is_discharging());
        // Discharge continues without the flag.
        for _ in 0..600 {
            s.tick(&full_throttle(), &mut ());
        }
        assert!(!s.charged_boost().is_discharging());
        assert_eq!(s.charged_boost().charge(), 1.0);
    }

    #[test]
    fn test_zero_dt_tick_keeps_position() {
        let mut s = ship();
        run(&mut s, &full_throttle(), 30);
        let before = s.pose();
        let out = s.tick(&TickInput::new(0.0), &mut ());
        assert_eq!(out.pose, before);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut s = ship();
        let mut sink = Recorder::default();
        s.set_minimum_speed(99.0);
        s.set_throttle_scaler(1.0);
        s.add_throttle_modifier(0.3, 10.0).unwrap();
        s.add_velocity_modifier(Vec3::X, 10.0).unwrap();
        s.tick(&full_throttle(), &mut sink);
        assert!(s.is_slowed());

        s.reset(&mut sink);
        assert_eq!(s.throttle_modifier_count(), 0);
        assert_eq!(s.velocity_modifier_count(), 0);
        assert_eq!(s.state().minimum_speed, 10.0);
        assert_eq!(s.state().throttle_scaler, 50.0);
        assert_eq!(s.state().speed, 0.0);
        assert!(!s.is_slowed());
        assert_eq!(sink.slowed, vec![true, false]);
        assert_eq!(s.orientation().target(), s.orientation().current());
    }

    #[test]
    fn test_homing_ship_moves_toward_target() {
        let mut s = ShipKinematics::new(ShipClass::Command.tuning(), Pose::default());
        s.set_homing_target(Some(Vec3::new(0.0, 0.0, 100.0)));
        let out = run(&mut s, &TickInput::new(0.1), 50);
        assert!(out.pose.position.z > 0.0);
        assert!(out.pose.position.z < 100.0);
        assert!((out.state.course - Vec3::Z).length() < 1e-4);
        assert!(s.is_orientation_forced());
    }

    #[test]
    fn test_homing_without_throttle_stops() {
        let mut s = ShipKinematics::new(ShipClass::Command.tuning(), Pose::default());
        s.set_homing_target(Some(Vec3::new(0.0, 0.0, 100.0)));
        let lost = TickInput {
            throttle: None,
            ..TickInput::new(0.1)
        };
        let out = s.tick(&lost, &mut ());
        assert_eq!(out.state.speed, 0.0);
        assert_eq!(out.pose.position, Vec3::ZERO);
    }

    #[test]
    fn test_teleport_and_face_course() {
        let mut s = ship();
        s.teleport(Pose::new(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2),
        ));
        assert_eq!(s.pose().position, Vec3::new(5.0, 0.0, 0.0));
        assert!((s.state().course - Vec3::X).length() < 1e-4);
        s.face_course();
        assert!((s.orientation_quat() * Vec3::Z - Vec3::X).length() < 1e-4);
    }
}

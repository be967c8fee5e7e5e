//! Orientation integration: axis signals → accumulated target → damped pose.
//!
//! The integrator keeps two rotations. The *target* accumulates axis input
//! every tick; the *current* orientation chases it with the exponential
//! approach from [`crate::damping`]. Axis rotations are taken about the
//! current orientation's local axes and applied in a fixed order:
//! pitch (local right), yaw (local up), roll (local forward).
//!
//! Convention: +X right, +Y up, +Z forward. Positive pitch lowers the nose,
//! positive yaw turns right.
//!
//! In [`OrientationMode::Forced`] the target is owned by an external system
//! (command-target homing, scripted spins) and axis input is ignored.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::rotation::*;
use crate::damping::approach_rotation;

/// Angular rate tunables, in degrees/second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScalers {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    /// Added per unit of current speed to every axis.
    pub rotation_throttle: f32,
}

impl Default for AxisScalers {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_PITCH_SCALER,
            yaw: DEFAULT_YAW_SCALER,
            roll: DEFAULT_ROLL_SCALER,
            rotation_throttle: DEFAULT_ROTATION_THROTTLE_SCALER,
        }
    }
}

impl AxisScalers {
    /// Degrees/second for one axis at the given speed.
    pub fn rate(&self, axis_scaler: f32, speed: f32) -> f32 {
        speed * self.rotation_throttle + axis_scaler
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationMode {
    /// Driven by pitch/yaw/roll axis input.
    Direct,
    /// Target supplied by an external system.
    Forced,
}

/// Build the rotation whose forward (+Z) axis points along `forward`.
///
/// Returns `None` for a zero-length or non-finite direction. If `up` is
/// parallel to `forward`, an arbitrary perpendicular up is used.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize()?;
    let right = up
        .cross(f)
        .try_normalize()
        .unwrap_or_else(|| f.any_orthonormal_vector());
    let true_up = f.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, true_up, f)).normalize())
}

/// Damp `current` toward `target`.
pub fn approach(current: Quat, target: Quat, damping_rate: f32, delta_time: f32) -> Quat {
    approach_rotation(current, target, damping_rate, delta_time)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationIntegrator {
    current: Quat,
    target: Quat,
    mode: OrientationMode,
}

impl OrientationIntegrator {
    /// Start at the spawn rotation, in direct mode.
    pub fn new(spawn: Quat) -> Self {
        let spawn = spawn.normalize();
        Self {
            current: spawn,
            target: spawn,
            mode: OrientationMode::Direct,
        }
    }

    pub fn current(&self) -> Quat {
        self.current
    }

    pub fn target(&self) -> Quat {
        self.target
    }

    pub fn mode(&self) -> OrientationMode {
        self.mode
    }

    pub fn forward(&self) -> Vec3 {
        self.current * Vec3::Z
    }

    pub fn up(&self) -> Vec3 {
        self.current * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.current * Vec3::X
    }

    /// Integrate one tick of axis input into the target rotation.
    ///
    /// `speed` feeds the rotation-throttle term of each axis rate. No effect
    /// while the target is forced.
    pub fn accumulate_axes(
        &mut self,
        pitch: f32,
        yaw: f32,
        roll: f32,
        delta_time: f32,
        scalers: &AxisScalers,
        speed: f32,
    ) {
        if self.mode == OrientationMode::Forced {
            return;
        }
        let right = self.right();
        let up = self.up();
        let forward = self.forward();

        // Quaternions don't commute; this order is part of the contract.
        let steps = [
            (right, pitch * scalers.rate(scalers.pitch, speed)),
            (up, yaw * scalers.rate(scalers.yaw, speed)),
            (forward, roll * scalers.rate(scalers.roll, speed)),
        ];
        for (axis, degrees_per_second) in steps {
            let angle = (degrees_per_second * delta_time).to_radians();
            self.target = Quat::from_axis_angle(axis, angle) * self.target;
        }
        self.target = self.target.normalize();
    }

    /// Damp the current orientation toward the target.
    ///
    /// `gyro` is composed onto the target in direct mode only.
    pub fn settle(&mut self, damping_rate: f32, delta_time: f32, gyro: Option<Quat>) -> Quat {
        let goal = match (self.mode, gyro) {
            (OrientationMode::Direct, Some(g)) => (self.target * g).normalize(),
            _ => self.target,
        };
        self.current = approach(self.current, goal, damping_rate, delta_time);
        self.current
    }

    /// Hand the target to an external system.
    pub fn force_target(&mut self, target: Quat) {
        self.mode = OrientationMode::Forced;
        self.target = target.normalize();
    }

    /// Return to axis control, keeping the last forced target.
    pub fn release(&mut self) {
        self.mode = OrientationMode::Direct;
    }

    /// Turn the target 180° about the current up axis.
    pub fn flat_spin(&mut self) {
        self.target = (Quat::from_axis_angle(self.up(), std::f32::consts::PI) * self.target)
            .normalize();
    }

    /// Nudge the target toward facing `direction` with the given `up`.
    ///
    /// `amount` is a blend fraction in `[0, 1]`. Degenerate directions are ignored.
    pub fn gentle_spin(&mut self, direction: Vec3, up: Vec3, amount: f32) {
        if let Some(look) = look_rotation(direction, up) {
            self.target = self.target.slerp(look, amount.clamp(0.0, 1.0)).normalize();
        }
    }

    /// Face `direction` immediately, world up as reference.
    pub fn snap_to(&mut self, direction: Vec3) {
        if let Some(look) = look_rotation(direction, Vec3::Y) {
            self.current = look;
            self.target = look;
        }
    }

    /// Pre-multiply `rotation` onto the target, or replace it outright.
    pub fn rotate(&mut self, rotation: Quat, replace: bool) {
        self.target = if replace {
            rotation.normalize()
        } else {
            (rotation * self.target).normalize()
        };
    }

    /// Set both current and target, e.g. from a replicated snapshot.
    pub fn set_orientation(&mut self, orientation: Quat) {
        let orientation = orientation.normalize();
        self.current = orientation;
        self.target = orientation;
    }

    /// Re-anchor the target at the current orientation.
    pub fn reset_target(&mut self) {
        self.target = self.current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_look_rotation_identity_and_yaw() {
        let q = look_rotation(Vec3::Z, Vec3::Y).unwrap();
        assert!(q.angle_between(Quat::IDENTITY) < 1e-4);

        let q = look_rotation(Vec3::X, Vec3::Y).unwrap();
        assert!(close(q * Vec3::Z, Vec3::X));
        assert!(close(q * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
        // Up parallel to forward still yields a valid rotation.
        let q = look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert!(close(q * Vec3::Z, Vec3::Y));
    }

    #[test]
    fn test_yaw_accumulates_about_up() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        let scalers = AxisScalers {
            yaw: 90.0,
            ..AxisScalers::default()
        };
        o.accumulate_axes(0.0, 1.0, 0.0, 1.0, &scalers, 0.0);
        assert!(close(o.target() * Vec3::Z, Vec3::X));
        // Current has not moved yet.
        assert!(close(o.forward(), Vec3::Z));
    }

    #[test]
    fn test_positive_pitch_lowers_nose() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.accumulate_axes(0.5, 0.0, 0.0, 0.1, &AxisScalers::default(), 0.0);
        assert!((o.target() * Vec3::Z).y < 0.0);
    }

    #[test]
    fn test_rotation_throttle_term() {
        let scalers = AxisScalers {
            rotation_throttle: 2.0,
            ..AxisScalers::default()
        };
        assert_eq!(scalers.rate(130.0, 10.0), 150.0);

        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.accumulate_axes(0.0, 0.0, 1.0, 0.1, &scalers, 10.0);
        // 150 deg/s * 0.1 s = 15 degrees of roll
        let angle = o.target().angle_between(Quat::IDENTITY).to_degrees();
        assert!((angle - 15.0).abs() < 1e-2, "angle={angle}");
    }

    #[test]
    fn test_axis_order_is_pitch_yaw_roll() {
        let scalers = AxisScalers {
            pitch: 90.0,
            yaw: 90.0,
            roll: 90.0,
            rotation_throttle: 0.0,
        };
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.accumulate_axes(1.0, 1.0, 1.0, 1.0, &scalers, 0.0);

        let quarter = 90f32.to_radians();
        let expected = Quat::from_axis_angle(Vec3::Z, quarter)
            * Quat::from_axis_angle(Vec3::Y, quarter)
            * Quat::from_axis_angle(Vec3::X, quarter);
        assert!(o.target().angle_between(expected) < 1e-4);

        let wrong = Quat::from_axis_angle(Vec3::X, quarter)
            * Quat::from_axis_angle(Vec3::Y, quarter)
            * Quat::from_axis_angle(Vec3::Z, quarter);
        assert!(o.target().angle_between(wrong) > 0.1);
    }

    #[test]
    fn test_settle_approaches_without_reaching() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.rotate(Quat::from_axis_angle(Vec3::Y, 1.0), true);
        let mut prev = o.current().angle_between(o.target());
        for _ in 0..60 {
            o.settle(2.0, 1.0 / 60.0, None);
            let gap = o.current().angle_between(o.target());
            assert!(gap <= prev + 1e-6);
            prev = gap;
        }
        assert!(prev > 0.0);
        assert!(prev < 1.0);
    }

    #[test]
    fn test_gyro_composes_in_direct_mode_only() {
        let gyro = Quat::from_axis_angle(Vec3::Y, 0.5);
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        for _ in 0..600 {
            o.settle(2.0, 0.05, Some(gyro));
        }
        assert!(o.current().angle_between(gyro) < 1e-3);

        let mut forced = OrientationIntegrator::new(Quat::IDENTITY);
        forced.force_target(Quat::IDENTITY);
        for _ in 0..100 {
            forced.settle(2.0, 0.05, Some(gyro));
        }
        assert!(forced.current().angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_forced_mode_ignores_axes() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        let forced = Quat::from_axis_angle(Vec3::X, 0.4);
        o.force_target(forced);
        o.accumulate_axes(1.0, 1.0, 1.0, 1.0, &AxisScalers::default(), 0.0);
        assert_eq!(o.mode(), OrientationMode::Forced);
        assert!(o.target().angle_between(forced) < 1e-5);

        o.release();
        assert_eq!(o.mode(), OrientationMode::Direct);
        assert!(o.target().angle_between(forced) < 1e-5);
    }

    #[test]
    fn test_flat_spin_reverses_target() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.flat_spin();
        assert!(close(o.target() * Vec3::Z, -Vec3::Z));
        assert!(close(o.target() * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn test_gentle_spin_partial() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.gentle_spin(Vec3::X, Vec3::Y, 0.5);
        let f = o.target() * Vec3::Z;
        assert!(f.x > 0.5 && f.z > 0.5);
        // Degenerate direction leaves target alone.
        let before = o.target();
        o.gentle_spin(Vec3::ZERO, Vec3::Y, 1.0);
        assert_eq!(o.target(), before);
    }

    #[test]
    fn test_snap_and_reset_target() {
        let mut o = OrientationIntegrator::new(Quat::IDENTITY);
        o.snap_to(-Vec3::X);
        assert!(close(o.forward(), -Vec3::X));
        o.rotate(Quat::from_axis_angle(Vec3::Y, 0.7), false);
        o.reset_target();
        assert_eq!(o.target(), o.current());
    }
}

//! Critically-damped exponential approach, shared by speed and orientation.
//!
//! Each step closes a fraction `1 - exp(-rate * dt)` of the remaining gap.
//! The fraction is always in `[0, 1)` for finite inputs, so the value never
//! overshoots and never reaches the target in finite time.

use glam::Quat;

/// Fraction of the remaining gap closed in one step.
///
/// Non-positive `rate` or `delta_time` close nothing.
pub fn approach_factor(rate: f32, delta_time: f32) -> f32 {
    if rate <= 0.0 || delta_time <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * delta_time).exp()
}

/// Move `current` toward `target` by one damped step.
pub fn approach_scalar(current: f32, target: f32, rate: f32, delta_time: f32) -> f32 {
    current + (target - current) * approach_factor(rate, delta_time)
}

/// Spherically move `current` toward `target` by one damped step.
pub fn approach_rotation(current: Quat, target: Quat, rate: f32, delta_time: f32) -> Quat {
    let t = approach_factor(rate, delta_time);
    if t == 0.0 {
        return current;
    }
    current.slerp(target, t).normalize()
}

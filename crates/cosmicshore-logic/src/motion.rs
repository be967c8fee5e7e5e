//! Position integration from speed, course and velocity shift.
//!
//! Two movement styles:
//! - **Free flight**: `position += (speed * course + shift) * dt`.
//! - **Homing** (command-stick hulls): position lerps toward a target point
//!   and the course is re-derived from what remains of the gap.
//!
//! A near-zero course never reaches the arithmetic: the directional term is
//! skipped for that tick and a [`DegenerateDirectionWarning`] is returned.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::tolerance::DIRECTION_EPSILON;

/// Position and orientation of a ship, written once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

/// Non-fatal: a direction vector was too short to normalize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateDirectionWarning {
    pub magnitude: f32,
}

impl fmt::Display for DegenerateDirectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "direction magnitude {} below {}, directional update skipped",
            self.magnitude, DIRECTION_EPSILON
        )
    }
}

impl std::error::Error for DegenerateDirectionWarning {}

/// Normalize `v`, or report it as degenerate.
pub fn try_direction(v: Vec3) -> Result<Vec3, DegenerateDirectionWarning> {
    let magnitude = v.length();
    if !(magnitude >= DIRECTION_EPSILON) || !magnitude.is_finite() {
        return Err(DegenerateDirectionWarning { magnitude });
    }
    Ok(v / magnitude)
}

/// Result of one free-flight step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub pose: Pose,
    pub degenerate: Option<DegenerateDirectionWarning>,
}

/// Advance `pose` by one tick of free flight.
///
/// Orientation is carried through untouched; the caller owns it.
pub fn advance(
    pose: &Pose,
    speed: f32,
    course: Vec3,
    velocity_shift: Vec3,
    delta_time: f32,
) -> Advance {
    let (directional, degenerate) = match try_direction(course) {
        Ok(dir) => (dir * speed, None),
        Err(warning) => {
            log::warn!("course: {}", warning);
            (Vec3::ZERO, Some(warning))
        }
    };

    Advance {
        pose: Pose {
            position: pose.position + (directional + velocity_shift) * delta_time,
            orientation: pose.orientation,
        },
        degenerate,
    }
}

/// Result of one homing step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingStep {
    pub position: Vec3,
    /// Unit course toward the target, or the warning if already on it.
    pub course: Result<Vec3, DegenerateDirectionWarning>,
}

/// Lerp `position` toward `target` by `speed * dt` (clamped to `[0, 1]`).
pub fn advance_toward(position: Vec3, target: Vec3, speed: f32, delta_time: f32) -> HomingStep {
    let t = (speed * delta_time).clamp(0.0, 1.0);
    let position = position.lerp(target, t);
    let course = try_direction(target - position);
    if let Err(warning) = &course {
        log::warn!("homing target reached: {}", warning);
    }
    HomingStep { position, course }
}

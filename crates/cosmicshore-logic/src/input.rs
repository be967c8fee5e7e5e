//! Per-tick pilot input and discrete control events.
//!
//! A [`TickInput`] is what the host hands the flight core each frame,
//! whether it came from a gamepad, touch controls, or an AI pilot. Axis
//! values are already normalized; [`TickInput::sanitized`] only clamps them
//! into range.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::tolerance::STRAIGHT_FLIGHT_THRESHOLD;

/// Normalized input for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// [-1, 1], positive lowers the nose.
    pub pitch: f32,
    /// [-1, 1], positive turns right.
    pub yaw: f32,
    /// [-1, 1]
    pub roll: f32,
    /// [0, 1]; `None` when no throttle device is connected.
    pub throttle: Option<f32>,
    pub boosting: bool,
    /// Build charged-boost charge this tick.
    pub charging_boost: bool,
    /// Start (or continue) releasing stored charge.
    pub charged_boost_discharging: bool,
    pub drifting: bool,
    pub gyro_enabled: bool,
    /// Device attitude, composed onto the target while `gyro_enabled`.
    pub gyro_rotation: Quat,
    /// Course to hold while drifting. `None` keeps the course latched at drift start.
    pub drift_course: Option<Vec3>,
    /// Seconds, > 0.
    pub delta_time: f32,
}

impl TickInput {
    /// Idle input: throttle device present at zero, no flags set.
    pub fn new(delta_time: f32) -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            throttle: Some(0.0),
            boosting: false,
            charging_boost: false,
            charged_boost_discharging: false,
            drifting: false,
            gyro_enabled: false,
            gyro_rotation: Quat::IDENTITY,
            drift_course: None,
            delta_time,
        }
    }

    /// Clamp axes into their ranges and the timestep to >= 0.
    pub fn sanitized(&self) -> Self {
        Self {
            pitch: self.pitch.clamp(-1.0, 1.0),
            yaw: self.yaw.clamp(-1.0, 1.0),
            roll: self.roll.clamp(-1.0, 1.0),
            throttle: self.throttle.map(|t| t.clamp(0.0, 1.0)),
            delta_time: self.delta_time.max(0.0),
            ..*self
        }
    }
}

/// Discrete control events routed to a ship's actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlEvent {
    Boost,
    Drift,
    ChargedBoost,
    FlatSpin,
    Gyro,
    /// Full throttle with sticks centred.
    FullSpeedStraight,
    /// Zero throttle with sticks centred.
    MinimumSpeedStraight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonPhase {
    Pressed,
    Released,
}

/// Turns axis input into straight-flight press/release events.
///
/// Deviation from full-speed-straight is `(1 - throttle) + |pitch| + |yaw| + |roll|`;
/// from minimum-speed-straight it is `throttle + |pitch| + |yaw| + |roll|`. An
/// event presses when its deviation drops under the threshold and releases
/// once it climbs back over.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StraightFlightDetector {
    full_speed_started: bool,
    minimum_speed_started: bool,
}

impl StraightFlightDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, input: &TickInput) -> Vec<(ControlEvent, ButtonPhase)> {
        let mut events = Vec::new();
        let throttle = input.throttle.unwrap_or(0.0);
        let rotation = input.pitch.abs() + input.yaw.abs() + input.roll.abs();
        let from_full = (1.0 - throttle) + rotation;
        let from_minimum = throttle + rotation;
        let threshold = STRAIGHT_FLIGHT_THRESHOLD;

        if from_full < threshold && !self.full_speed_started {
            self.full_speed_started = true;
            events.push((ControlEvent::FullSpeedStraight, ButtonPhase::Pressed));
        } else if from_minimum < threshold && !self.minimum_speed_started {
            self.minimum_speed_started = true;
            events.push((ControlEvent::MinimumSpeedStraight, ButtonPhase::Pressed));
        } else {
            if self.full_speed_started && from_full > threshold {
                self.full_speed_started = false;
                events.push((ControlEvent::FullSpeedStraight, ButtonPhase::Released));
            }
            if self.minimum_speed_started && from_minimum > threshold {
                self.minimum_speed_started = false;
                events.push((ControlEvent::MinimumSpeedStraight, ButtonPhase::Released));
            }
        }
        events
    }
}

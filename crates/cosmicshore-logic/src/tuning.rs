//! Per-ship flight tuning and named class presets.
//!
//! Every hull flies with the same integrator; what differs is data. A
//! [`ShipTuning`] carries every scaler, damping rate and clamp ceiling the
//! flight pipeline reads, and [`ShipClass::tuning`] returns the preset for a
//! named hull.
//!
//! ```
//! use cosmicshore_logic::tuning::{ShipClass, validate_tuning};
//!
//! let tuning = ShipClass::Manta.tuning();
//! assert!(validate_tuning(&tuning).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{modifiers, rotation, speed};
use crate::modifiers::{CompositionRule, ThrottleComposer, VelocityComposer};
use crate::orientation::AxisScalers;
use crate::throttle::ChargedBoostTuning;

/// How a hull turns speed into position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Fly along the course at the current speed.
    #[default]
    FreeFlight,
    /// Lerp toward a commanded target point, facing along the remaining gap.
    Homing,
}

/// Every tunable the flight pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipTuning {
    /// Speed floor restored on reset.
    pub minimum_speed: f32,
    /// Throttle gain restored on reset.
    pub throttle_scaler: f32,
    pub axis_scalers: AxisScalers,
    pub orientation_damping: f32,
    pub speed_damping: f32,
    pub boost_multiplier: f32,
    /// Ceiling on the composed throttle multiplier.
    pub speed_modifier_max: f32,
    /// Ceiling on the composed velocity shift magnitude.
    pub velocity_modifier_max: f32,
    pub composition_rule: CompositionRule,
    pub charged_boost: ChargedBoostTuning,
    pub movement_mode: MovementMode,
    /// Initial speed for homing hulls, which have no throttle floor.
    pub initial_speed: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            minimum_speed: speed::DEFAULT_MINIMUM_SPEED,
            throttle_scaler: speed::DEFAULT_THROTTLE_SCALER,
            axis_scalers: AxisScalers::default(),
            orientation_damping: rotation::DEFAULT_ORIENTATION_DAMPING,
            speed_damping: speed::DEFAULT_SPEED_DAMPING,
            boost_multiplier: speed::DEFAULT_BOOST_MULTIPLIER,
            speed_modifier_max: modifiers::SPEED_MODIFIER_MAX,
            velocity_modifier_max: modifiers::VELOCITY_MODIFIER_MAX,
            composition_rule: CompositionRule::default(),
            charged_boost: ChargedBoostTuning::default(),
            movement_mode: MovementMode::default(),
            initial_speed: 0.0,
        }
    }
}

impl ShipTuning {
    pub fn throttle_composer(&self) -> ThrottleComposer {
        ThrottleComposer {
            ceiling: self.speed_modifier_max,
            rule: self.composition_rule,
        }
    }

    pub fn velocity_composer(&self) -> VelocityComposer {
        VelocityComposer {
            ceiling: self.velocity_modifier_max,
        }
    }
}

/// Named hull presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    Manta,
    Dolphin,
    Rhino,
    Squirrel,
    Sparrow,
    Serpent,
    /// Command-stick hull that homes on a target point.
    Command,
}

impl ShipClass {
    pub const ALL: [ShipClass; 7] = [
        ShipClass::Manta,
        ShipClass::Dolphin,
        ShipClass::Rhino,
        ShipClass::Squirrel,
        ShipClass::Sparrow,
        ShipClass::Serpent,
        ShipClass::Command,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShipClass::Manta => "Manta",
            ShipClass::Dolphin => "Dolphin",
            ShipClass::Rhino => "Rhino",
            ShipClass::Squirrel => "Squirrel",
            ShipClass::Sparrow => "Sparrow",
            ShipClass::Serpent => "Serpent",
            ShipClass::Command => "Command",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Preset tuning for this hull.
    pub fn tuning(self) -> ShipTuning {
        let base = ShipTuning::default();
        match self {
            ShipClass::Manta => base,
            ShipClass::Dolphin => ShipTuning {
                throttle_scaler: 60.0,
                axis_scalers: AxisScalers {
                    pitch: 150.0,
                    yaw: 150.0,
                    roll: 150.0,
                    rotation_throttle: 0.0,
                },
                orientation_damping: 3.0,
                ..base
            },
            ShipClass::Rhino => ShipTuning {
                minimum_speed: 15.0,
                throttle_scaler: 40.0,
                axis_scalers: AxisScalers {
                    pitch: 100.0,
                    yaw: 100.0,
                    roll: 110.0,
                    rotation_throttle: 0.0,
                },
                boost_multiplier: 5.0,
                charged_boost: ChargedBoostTuning {
                    growth_rate: 2.4,
                    max_charge: 12.0,
                },
                ..base
            },
            ShipClass::Squirrel => ShipTuning {
                minimum_speed: 20.0,
                throttle_scaler: 70.0,
                axis_scalers: AxisScalers {
                    pitch: 140.0,
                    yaw: 140.0,
                    roll: 140.0,
                    rotation_throttle: 0.5,
                },
                speed_damping: 2.5,
                ..base
            },
            ShipClass::Sparrow => ShipTuning {
                throttle_scaler: 55.0,
                axis_scalers: AxisScalers {
                    pitch: 160.0,
                    yaw: 160.0,
                    roll: 130.0,
                    rotation_throttle: 0.0,
                },
                boost_multiplier: 3.0,
                ..base
            },
            ShipClass::Serpent => ShipTuning {
                minimum_speed: 12.0,
                axis_scalers: AxisScalers {
                    pitch: 120.0,
                    yaw: 120.0,
                    roll: 90.0,
                    rotation_throttle: 0.25,
                },
                composition_rule: CompositionRule::Multiplicative,
                ..base
            },
            ShipClass::Command => ShipTuning {
                minimum_speed: 0.0,
                movement_mode: MovementMode::Homing,
                initial_speed: 0.1,
                ..base
            },
        }
    }
}

/// Tuning validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// A field that must be finite and >= 0 was not.
    Negative(&'static str, f32),
    /// A damping rate that must be > 0 was not.
    NonPositiveDamping(&'static str, f32),
    /// Boost multiplier below 1 would slow a boosting ship.
    BoostBelowOne(f32),
    /// Charge ceiling below the neutral charge of 1.0.
    MaxChargeBelowOne(f32),
}

/// Validate a tuning, returning all errors found.
pub fn validate_tuning(tuning: &ShipTuning) -> Vec<TuningError> {
    let mut errors = Vec::new();

    let non_negative = [
        ("minimum_speed", tuning.minimum_speed),
        ("throttle_scaler", tuning.throttle_scaler),
        ("pitch_scaler", tuning.axis_scalers.pitch),
        ("yaw_scaler", tuning.axis_scalers.yaw),
        ("roll_scaler", tuning.axis_scalers.roll),
        ("rotation_throttle_scaler", tuning.axis_scalers.rotation_throttle),
        ("speed_modifier_max", tuning.speed_modifier_max),
        ("velocity_modifier_max", tuning.velocity_modifier_max),
        ("charge_growth_rate", tuning.charged_boost.growth_rate),
        ("initial_speed", tuning.initial_speed),
    ];
    for (field, value) in non_negative {
        if !(value >= 0.0) || !value.is_finite() {
            errors.push(TuningError::Negative(field, value));
        }
    }

    for (field, value) in [
        ("orientation_damping", tuning.orientation_damping),
        ("speed_damping", tuning.speed_damping),
    ] {
        if !(value > 0.0) || !value.is_finite() {
            errors.push(TuningError::NonPositiveDamping(field, value));
        }
    }

    if !(tuning.boost_multiplier >= 1.0) {
        errors.push(TuningError::BoostBelowOne(tuning.boost_multiplier));
    }
    if !(tuning.charged_boost.max_charge >= 1.0) {
        errors.push(TuningError::MaxChargeBelowOne(tuning.charged_boost.max_charge));
    }

    errors
}

//! Flight constants: default tunables and clamp ceilings.
//!
//! Plain `f32` values with no engine dependency. Ship presets in
//! [`crate::tuning`] start from these and override per class.

pub mod speed {
    /// Speed floor added to every throttle demand.
    pub const DEFAULT_MINIMUM_SPEED: f32 = 10.0;
    /// Units/second gained per unit of throttle axis.
    pub const DEFAULT_THROTTLE_SCALER: f32 = 50.0;
    /// Multiplier applied to the throttle demand while boosting.
    pub const DEFAULT_BOOST_MULTIPLIER: f32 = 4.0;
    /// Exponential approach rate for speed (per second).
    pub const DEFAULT_SPEED_DAMPING: f32 = 2.0;
}

pub mod rotation {
    /// Degrees/second at full pitch deflection.
    pub const DEFAULT_PITCH_SCALER: f32 = 130.0;
    /// Degrees/second at full yaw deflection.
    pub const DEFAULT_YAW_SCALER: f32 = 130.0;
    /// Degrees/second at full roll deflection.
    pub const DEFAULT_ROLL_SCALER: f32 = 130.0;
    /// Extra degrees/second per unit of speed. Zero on most hulls.
    pub const DEFAULT_ROTATION_THROTTLE_SCALER: f32 = 0.0;
    /// Exponential approach rate for orientation (per second).
    pub const DEFAULT_ORIENTATION_DAMPING: f32 = 2.0;
}

pub mod modifiers {
    /// Ceiling on the composed throttle multiplier.
    pub const SPEED_MODIFIER_MAX: f32 = 6.0;
    /// Ceiling on the composed velocity shift magnitude.
    pub const VELOCITY_MODIFIER_MAX: f32 = 100.0;
    /// Standard duration of a trail-block speed debuff, in seconds.
    pub const SPEED_MODIFIER_DURATION: f32 = 2.0;
    /// Neutral throttle multiplier.
    pub const NEUTRAL_MULTIPLIER: f32 = 1.0;
}

pub mod boost {
    /// Charge never drops below this; a charge of 1.0 is a neutral factor.
    pub const MIN_CHARGE: f32 = 1.0;
    /// Charge ceiling.
    pub const DEFAULT_MAX_CHARGE: f32 = 10.0;
    /// Charge gained per second while charging.
    pub const DEFAULT_CHARGE_GROWTH_RATE: f32 = 1.8;
}

pub mod tolerance {
    /// Below this length a direction vector is treated as degenerate.
    pub const DIRECTION_EPSILON: f32 = 1e-5;
    /// Axis deviation under which flight counts as "straight".
    pub const STRAIGHT_FLIGHT_THRESHOLD: f32 = 0.3;
    /// Relative slack on modifier expiry, absorbs drift from summed timesteps.
    pub const EXPIRY_RELATIVE_EPSILON: f32 = 1e-5;
}

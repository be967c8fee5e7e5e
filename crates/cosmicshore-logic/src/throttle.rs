//! Throttle model: axis + boost → target speed → damped speed.
//!
//! ```
//! use cosmicshore_logic::throttle::{compute_target_speed, Boost};
//!
//! let target = compute_target_speed(1.0, 10.0, 50.0, Boost::NONE);
//! assert_eq!(target, 60.0);
//! ```
//!
//! Charged boost is persistent state rather than a timed loop: charge
//! builds while the pilot holds the charge control, then a latched
//! discharge applies the charge as an extra boost factor and bleeds it
//! back down to 1.0 over subsequent ticks.

use serde::{Deserialize, Serialize};

use crate::constants::boost::{DEFAULT_CHARGE_GROWTH_RATE, DEFAULT_MAX_CHARGE, MIN_CHARGE};
use crate::damping::approach_scalar;

/// Boost state feeding one target-speed computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    pub active: bool,
    pub multiplier: f32,
    /// Current charged-boost charge, `Some` only while a discharge is in progress.
    pub charge: Option<f32>,
}

impl Boost {
    pub const NONE: Self = Self {
        active: false,
        multiplier: 1.0,
        charge: None,
    };

    /// Combined factor applied to the throttle term.
    pub fn effective(&self) -> f32 {
        let base = if self.active { self.multiplier } else { 1.0 };
        match self.charge {
            Some(charge) => base * charge,
            None => base,
        }
    }
}

/// `throttle_axis * throttle_scaler * boost + minimum_speed`.
///
/// The modifier multiplier is not part of the target; it scales the damped
/// speed afterwards (see [`step_speed`]).
pub fn compute_target_speed(
    throttle_axis: f32,
    minimum_speed: f32,
    throttle_scaler: f32,
    boost: Boost,
) -> f32 {
    throttle_axis * throttle_scaler * boost.effective() + minimum_speed
}

/// Damp `current_speed` toward `target_speed`.
pub fn approach_speed(
    current_speed: f32,
    target_speed: f32,
    damping_rate: f32,
    delta_time: f32,
) -> f32 {
    approach_scalar(current_speed, target_speed, damping_rate, delta_time)
}

/// One full throttle step.
///
/// With no throttle device (`target_speed == None`) speed drops to exactly
/// zero with no ramp. Otherwise the damped speed is scaled by the composed
/// modifier multiplier and floored at zero.
pub fn step_speed(
    current_speed: f32,
    target_speed: Option<f32>,
    modifier_multiplier: f32,
    damping_rate: f32,
    delta_time: f32,
) -> f32 {
    match target_speed {
        None => 0.0,
        Some(target) => {
            let damped = approach_speed(current_speed, target, damping_rate, delta_time);
            (damped * modifier_multiplier).max(0.0)
        }
    }
}

/// Charged-boost tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargedBoostTuning {
    /// Charge gained per second while charging.
    pub growth_rate: f32,
    pub max_charge: f32,
}

impl Default for ChargedBoostTuning {
    fn default() -> Self {
        Self {
            growth_rate: DEFAULT_CHARGE_GROWTH_RATE,
            max_charge: DEFAULT_MAX_CHARGE,
        }
    }
}

/// Stored charge for the charged-boost ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargedBoost {
    charge: f32,
    discharging: bool,
}

impl Default for ChargedBoost {
    fn default() -> Self {
        Self {
            charge: MIN_CHARGE,
            discharging: false,
        }
    }
}

impl ChargedBoost {
    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn is_discharging(&self) -> bool {
        self.discharging
    }

    /// Build charge for one tick. Ignored mid-discharge.
    pub fn accumulate(&mut self, tuning: &ChargedBoostTuning, delta_time: f32) {
        if self.discharging {
            return;
        }
        let gained = tuning.growth_rate * delta_time.max(0.0);
        self.charge = (self.charge + gained).clamp(MIN_CHARGE, tuning.max_charge.max(MIN_CHARGE));
    }

    /// Latch a discharge. No-op with nothing stored.
    pub fn begin_discharge(&mut self) {
        if self.charge > MIN_CHARGE {
            self.discharging = true;
        }
    }

    /// Advance a discharge by one tick.
    ///
    /// Returns the charge to apply this tick, or `None` when not discharging.
    /// The discharge ends once the charge has bled down to 1.0.
    pub fn discharge(&mut self, tuning: &ChargedBoostTuning, delta_time: f32) -> Option<f32> {
        if !self.discharging {
            return None;
        }
        let applied = self.charge;
        let ceiling = tuning.max_charge.max(MIN_CHARGE);
        self.charge = (self.charge - delta_time.max(0.0)).clamp(MIN_CHARGE, ceiling);
        if self.charge <= MIN_CHARGE {
            self.discharging = false;
            log::debug!("charged boost depleted");
        }
        Some(applied)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_speed_no_boost() {
        assert_eq!(compute_target_speed(1.0, 10.0, 50.0, Boost::NONE), 60.0);
        assert_eq!(compute_target_speed(0.0, 10.0, 50.0, Boost::NONE), 10.0);
        assert_eq!(compute_target_speed(0.5, 10.0, 50.0, Boost::NONE), 35.0);
    }

    #[test]
    fn test_target_speed_with_boost() {
        let boost = Boost {
            active: true,
            multiplier: 4.0,
            charge: None,
        };
        assert_eq!(compute_target_speed(1.0, 10.0, 50.0, boost), 210.0);
    }

    #[test]
    fn test_target_speed_charge_scales_boost() {
        let boost = Boost {
            active: true,
            multiplier: 2.0,
            charge: Some(3.0),
        };
        assert_eq!(boost.effective(), 6.0);
        let charged_only = Boost {
            charge: Some(3.0),
            ..Boost::NONE
        };
        assert_eq!(compute_target_speed(1.0, 0.0, 10.0, charged_only), 30.0);
    }

    #[test]
    fn test_step_without_throttle_is_hard_zero() {
        assert_eq!(step_speed(123.0, None, 6.0, 2.0, 0.016), 0.0);
    }

    #[test]
    fn test_step_applies_multiplier_after_damping() {
        let damped = approach_speed(0.0, 60.0, 2.0, 0.5);
        let stepped = step_speed(0.0, Some(60.0), 0.5, 2.0, 0.5);
        assert!((stepped - damped * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_step_never_negative() {
        assert_eq!(step_speed(5.0, Some(-100.0), 1.0, 2.0, 10.0), 0.0);
        assert_eq!(step_speed(5.0, Some(50.0), 0.0, 2.0, 0.1), 0.0);
    }

    #[test]
    fn test_approach_speed_monotone() {
        let mut speed = 0.0;
        for _ in 0..100 {
            let next = approach_speed(speed, 60.0, 2.0, 0.05);
            assert!(next >= speed && next < 60.0);
            speed = next;
        }
    }

    #[test]
    fn test_charge_builds_and_caps() {
        let tuning = ChargedBoostTuning {
            growth_rate: 2.0,
            max_charge: 4.0,
        };
        let mut cb = ChargedBoost::default();
        cb.accumulate(&tuning, 0.5);
        assert!((cb.charge() - 2.0).abs() < 1e-6);
        cb.accumulate(&tuning, 10.0);
        assert_eq!(cb.charge(), 4.0);
    }

    #[test]
    fn test_discharge_bleeds_to_one_then_stops() {
        let tuning = ChargedBoostTuning {
            growth_rate: 2.0,
            max_charge: 10.0,
        };
        let mut cb = ChargedBoost::default();
        cb.accumulate(&tuning, 1.0); // charge 3.0
        cb.begin_discharge();
        assert!(cb.is_discharging());

        assert_eq!(cb.discharge(&tuning, 1.0), Some(3.0));
        assert_eq!(cb.discharge(&tuning, 1.0), Some(2.0));
        assert!(!cb.is_discharging());
        assert_eq!(cb.charge(), 1.0);
        assert_eq!(cb.discharge(&tuning, 1.0), None);
    }

    #[test]
    fn test_discharge_needs_charge() {
        let mut cb = ChargedBoost::default();
        cb.begin_discharge();
        assert!(!cb.is_discharging());
    }

    #[test]
    fn test_no_charging_mid_discharge() {
        let tuning = ChargedBoostTuning::default();
        let mut cb = ChargedBoost::default();
        cb.accumulate(&tuning, 1.0);
        cb.begin_discharge();
        let before = cb.charge();
        cb.accumulate(&tuning, 1.0);
        assert_eq!(cb.charge(), before);
        cb.reset();
        assert_eq!(cb, ChargedBoost::default());
    }
}

//! Time-bounded speed and velocity modifiers.
//!
//! A modifier starts at its initial value and decays linearly toward the
//! neutral value (1.0 for throttle multipliers, zero for velocity shifts)
//! over its duration. Every tick advances all modifiers, drops the expired
//! ones, and folds the survivors into one composed value.
//!
//! Throttle composition under the default [`CompositionRule::BuffExcessAdditive`]:
//!
//! | Modifier | Contribution at progress `t` |
//! |----------|------------------------------|
//! | debuff (`initial < 1`) | `product *= lerp(initial, 1, t)` |
//! | buff (`initial >= 1`) | `product += lerp(initial - 1, 0, t)` |
//!
//! Modifiers are folded newest-first, and the result is clamped to
//! `[0, ceiling]`. Velocity shifts are summed and the magnitude of the sum
//! is clamped with its direction preserved.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::modifiers::{NEUTRAL_MULTIPLIER, SPEED_MODIFIER_MAX, VELOCITY_MODIFIER_MAX};
use crate::constants::tolerance::EXPIRY_RELATIVE_EPSILON;

/// Rejected modifier injection: duration was zero, negative, or NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidModifierError {
    pub duration: f32,
}

impl fmt::Display for InvalidModifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "modifier duration must be positive, got {}",
            self.duration
        )
    }
}

impl std::error::Error for InvalidModifierError {}

/// A single time-decaying modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifier<V> {
    pub initial_value: V,
    /// Lifetime in seconds, always > 0.
    pub duration: f32,
    /// Seconds since the modifier was added, always >= 0.
    pub elapsed_time: f32,
}

impl<V> Modifier<V> {
    /// Fraction of the lifetime used up, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.elapsed_time / self.duration).clamp(0.0, 1.0)
    }

    /// True once `elapsed_time` reaches `duration`, within a relative epsilon.
    pub fn is_expired(&self) -> bool {
        self.elapsed_time >= self.duration - self.duration * EXPIRY_RELATIVE_EPSILON
    }
}

pub type ThrottleModifier = Modifier<f32>;
pub type VelocityModifier = Modifier<Vec3>;

/// How buffs and debuffs combine into a throttle multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositionRule {
    /// Debuffs multiply, buffs add their excess over 1.0.
    #[default]
    BuffExcessAdditive,
    /// Every modifier multiplies, buffs included.
    Multiplicative,
}

/// Folds active modifiers into one composed value.
pub trait Composer<V> {
    /// Starting value of the fold.
    fn neutral(&self) -> V;
    /// Fold one active modifier into the accumulator.
    fn fold(&self, acc: V, modifier: &Modifier<V>) -> V;
    /// Clamp the folded value.
    fn finish(&self, acc: V) -> V;
}

/// Throttle multiplier composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleComposer {
    pub ceiling: f32,
    pub rule: CompositionRule,
}

impl Default for ThrottleComposer {
    fn default() -> Self {
        Self {
            ceiling: SPEED_MODIFIER_MAX,
            rule: CompositionRule::default(),
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Composer<f32> for ThrottleComposer {
    fn neutral(&self) -> f32 {
        NEUTRAL_MULTIPLIER
    }

    fn fold(&self, acc: f32, modifier: &ThrottleModifier) -> f32 {
        let t = modifier.progress();
        let initial = modifier.initial_value;
        match self.rule {
            CompositionRule::BuffExcessAdditive if initial >= NEUTRAL_MULTIPLIER => {
                acc + lerp(initial - NEUTRAL_MULTIPLIER, 0.0, t)
            }
            _ => acc * lerp(initial, NEUTRAL_MULTIPLIER, t),
        }
    }

    fn finish(&self, acc: f32) -> f32 {
        acc.min(self.ceiling).max(0.0)
    }
}

/// Velocity shift composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityComposer {
    pub ceiling: f32,
}

impl Default for VelocityComposer {
    fn default() -> Self {
        Self {
            ceiling: VELOCITY_MODIFIER_MAX,
        }
    }
}

impl Composer<Vec3> for VelocityComposer {
    fn neutral(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn fold(&self, acc: Vec3, modifier: &VelocityModifier) -> Vec3 {
        acc + modifier.initial_value.lerp(Vec3::ZERO, modifier.progress())
    }

    fn finish(&self, acc: Vec3) -> Vec3 {
        acc.clamp_length_max(self.ceiling.max(0.0))
    }
}

/// Active modifiers of one kind, owned by a single ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierStack<V> {
    modifiers: Vec<Modifier<V>>,
}

impl<V> Default for ModifierStack<V> {
    fn default() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }
}

impl<V: Copy> ModifierStack<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier with zero elapsed time.
    pub fn add(&mut self, initial_value: V, duration: f32) -> Result<(), InvalidModifierError> {
        // `!(x > 0)` also rejects NaN.
        if !(duration > 0.0) {
            return Err(InvalidModifierError { duration });
        }
        self.modifiers.push(Modifier {
            initial_value,
            duration,
            elapsed_time: 0.0,
        });
        Ok(())
    }

    /// Advance every modifier by `delta_time`, drop the expired ones, and
    /// return the composed value of the rest.
    pub fn tick<C: Composer<V>>(&mut self, delta_time: f32, composer: &C) -> V {
        let dt = delta_time.max(0.0);
        for modifier in &mut self.modifiers {
            modifier.elapsed_time += dt;
        }

        let before = self.modifiers.len();
        self.modifiers.retain(|m| !m.is_expired());
        let expired = before - self.modifiers.len();
        if expired > 0 {
            log::debug!(
                "{} modifier(s) expired, {} active",
                expired,
                self.modifiers.len()
            );
        }

        let folded = self
            .modifiers
            .iter()
            .rev()
            .fold(composer.neutral(), |acc, m| composer.fold(acc, m));
        composer.finish(folded)
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn clear(&mut self) {
        self.modifiers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier<V>> {
        self.modifiers.iter()
    }
}

impl ModifierStack<f32> {
    /// Whether any active modifier slows the ship.
    pub fn has_debuff(&self) -> bool {
        self.modifiers
            .iter()
            .any(|m| m.initial_value < NEUTRAL_MULTIPLIER)
    }
}

//! Pure flight logic for Cosmic Shore ships.
//!
//! This crate contains the ship kinematics and modifier engine with no
//! dependency on any renderer, physics engine, or runtime. Functions take
//! plain data and return results, so every hull can be flown headless in
//! tests, in the fleet engine, or from a host game loop.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Speed, rotation, modifier and boost defaults |
//! | [`control`] | `ShipControl` capability, local and replicated ships |
//! | [`damping`] | Exponential approach shared by speed and orientation |
//! | [`input`] | Per-tick pilot input, control events, straight-flight detection |
//! | [`modifiers`] | Time-decaying throttle and velocity modifier stacks |
//! | [`motion`] | Free-flight and homing position integration |
//! | [`orientation`] | Axis integration into a damped target rotation |
//! | [`ship`] | `ShipKinematics`: the fixed-order tick pipeline |
//! | [`throttle`] | Target speed, damped speed, charged boost |
//! | [`tuning`] | Per-hull tunables, class presets, validation |

pub mod constants;
pub mod control;
pub mod damping;
pub mod input;
pub mod modifiers;
pub mod motion;
pub mod orientation;
pub mod ship;
pub mod throttle;
pub mod tuning;

//! Cosmic Shore Core - Fleet Flight Engine
//!
//! Flies any number of ships per frame on top of the pure flight logic in
//! `cosmicshore-logic`.
//!
//! # Architecture
//!
//! The engine uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Ships
//! - **Components**: Pure data attached to entities (Ship, PilotInput, ShipName)
//! - **Systems**: Logic that queries and updates components
//!
//! Side effects of a tick (a ship becoming slowed) land in a
//! [`SlowedRegistry`](systems::SlowedRegistry) owned by the engine.
//!
//! # Example
//!
//! ```rust
//! use cosmicshore_core::prelude::*;
//! use cosmicshore_logic::motion::Pose;
//! use cosmicshore_logic::tuning::ShipClass;
//!
//! let mut engine = FleetEngine::new();
//! let ship = engine.spawn_class("alpha", ShipClass::Manta, Pose::default());
//!
//! for _ in 0..60 {
//!     engine.update(1.0 / 60.0);
//! }
//! assert!(engine.pose_of(ship).is_some());
//! ```

pub mod components;
pub mod engine;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{FleetEngine, FleetError};
    pub use crate::systems::SlowedRegistry;
}

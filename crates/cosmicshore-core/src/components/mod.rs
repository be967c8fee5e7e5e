//! Component definitions for the fleet ECS.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod ship;

pub use ship::*;

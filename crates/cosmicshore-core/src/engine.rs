//! Fleet engine - main entry point for flying ships

use std::fmt;

use glam::Vec3;
use hecs::{Entity, World};

use cosmicshore_logic::control::{LocalShip, ShipControl};
use cosmicshore_logic::input::{ControlEvent, TickInput};
use cosmicshore_logic::modifiers::InvalidModifierError;
use cosmicshore_logic::motion::Pose;
use cosmicshore_logic::ship::KinematicState;
use cosmicshore_logic::tuning::{ShipClass, ShipTuning};

use crate::components::*;
use crate::systems::*;

/// Fleet operation error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FleetError {
    /// The entity is not a live ship.
    NoSuchShip(Entity),
    InvalidModifier(InvalidModifierError),
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::NoSuchShip(entity) => write!(f, "no ship for entity {:?}", entity),
            FleetError::InvalidModifier(e) => write!(f, "invalid modifier: {}", e),
        }
    }
}

impl std::error::Error for FleetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FleetError::InvalidModifier(e) => Some(e),
            FleetError::NoSuchShip(_) => None,
        }
    }
}

impl From<InvalidModifierError> for FleetError {
    fn from(e: InvalidModifierError) -> Self {
        FleetError::InvalidModifier(e)
    }
}

/// Main fleet engine
pub struct FleetEngine {
    /// ECS world containing all ships
    pub world: World,
    /// Simulation time in seconds since start
    pub sim_time: f64,
    slowed: SlowedRegistry,
    time_scale: f32,
}

impl FleetEngine {
    /// Create an empty fleet
    pub fn new() -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            slowed: SlowedRegistry::new(),
            time_scale: 1.0,
        }
    }

    /// Spawn a ship with custom tuning, idle input
    pub fn spawn_ship(&mut self, name: &str, tuning: ShipTuning, pose: Pose) -> Entity {
        self.spawn_inner(name, tuning, None, pose)
    }

    /// Spawn a ship from a class preset
    pub fn spawn_class(&mut self, name: &str, class: ShipClass, pose: Pose) -> Entity {
        self.spawn_inner(name, class.tuning(), Some(class), pose)
    }

    fn spawn_inner(
        &mut self,
        name: &str,
        tuning: ShipTuning,
        class: Option<ShipClass>,
        pose: Pose,
    ) -> Entity {
        let ship = Ship {
            control: LocalShip::new(tuning, pose),
            class,
        };
        let entity = self
            .world
            .spawn((ship, PilotInput::default(), ShipName(name.to_string())));
        log::info!(
            "spawned ship '{}' ({}) at {:?}",
            name,
            class.map_or("custom", ShipClass::name),
            pose.position
        );
        entity
    }

    /// Remove a ship. Returns false if it did not exist.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let name = self.name_of(entity);
        match self.world.despawn(entity) {
            Ok(()) => {
                self.slowed.remove(entity);
                log::info!("despawned ship '{}'", name.unwrap_or_default());
                true
            }
            Err(_) => false,
        }
    }

    /// Replace a ship's pilot input. `delta_time` is ignored.
    pub fn set_input(&mut self, entity: Entity, input: TickInput) -> Result<(), FleetError> {
        let mut pilot = self
            .world
            .get::<&mut PilotInput>(entity)
            .map_err(|_| FleetError::NoSuchShip(entity))?;
        pilot.0 = input;
        Ok(())
    }

    pub fn perform_action(
        &mut self,
        entity: Entity,
        event: ControlEvent,
    ) -> Result<(), FleetError> {
        self.ship_mut(entity, |ship| ship.control.perform_action(event))
    }

    pub fn stop_action(
        &mut self,
        entity: Entity,
        event: ControlEvent,
    ) -> Result<(), FleetError> {
        self.ship_mut(entity, |ship| ship.control.stop_action(event))
    }

    pub fn add_throttle_modifier(
        &mut self,
        entity: Entity,
        value: f32,
        duration: f32,
    ) -> Result<(), FleetError> {
        self.ship_mut(entity, |ship| {
            ship.control
                .kinematics_mut()
                .add_throttle_modifier(value, duration)
        })??;
        Ok(())
    }

    pub fn add_velocity_modifier(
        &mut self,
        entity: Entity,
        value: Vec3,
        duration: f32,
    ) -> Result<(), FleetError> {
        self.ship_mut(entity, |ship| {
            ship.control
                .kinematics_mut()
                .add_velocity_modifier(value, duration)
        })??;
        Ok(())
    }

    /// Clear a ship's modifiers and restore its tuned defaults.
    pub fn reset_ship(&mut self, entity: Entity) -> Result<(), FleetError> {
        let mut ship = self
            .world
            .get::<&mut Ship>(entity)
            .map_err(|_| FleetError::NoSuchShip(entity))?;
        ship.control
            .kinematics_mut()
            .reset(&mut self.slowed.sink_for(entity));
        Ok(())
    }

    /// Point a homing ship at `target`, or stop it homing with `None`.
    pub fn set_homing_target(
        &mut self,
        entity: Entity,
        target: Option<Vec3>,
    ) -> Result<(), FleetError> {
        self.ship_mut(entity, |ship| {
            ship.control.kinematics_mut().set_homing_target(target)
        })
    }

    /// Update every ship by delta_seconds
    pub fn update(&mut self, delta_seconds: f32) {
        let scaled_delta = (delta_seconds * self.time_scale).max(0.0);
        self.sim_time += scaled_delta as f64;
        flight_system(&mut self.world, &mut self.slowed, scaled_delta);
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn pose_of(&self, entity: Entity) -> Option<Pose> {
        self.world
            .get::<&Ship>(entity)
            .ok()
            .map(|ship| ship.control.pose())
    }

    pub fn state_of(&self, entity: Entity) -> Option<KinematicState> {
        self.world
            .get::<&Ship>(entity)
            .ok()
            .map(|ship| *ship.control.kinematics().state())
    }

    pub fn name_of(&self, entity: Entity) -> Option<String> {
        self.world
            .get::<&ShipName>(entity)
            .ok()
            .map(|name| name.0.clone())
    }

    pub fn ship_count(&self) -> usize {
        self.world.query::<&Ship>().iter().count()
    }

    /// Ships currently under a throttle debuff
    pub fn slowed_ships(&self) -> Vec<Entity> {
        self.slowed.iter().collect()
    }

    pub fn is_slowed(&self, entity: Entity) -> bool {
        self.slowed.contains(entity)
    }

    pub fn slowed_registry(&self) -> &SlowedRegistry {
        &self.slowed
    }

    fn ship_mut<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut Ship) -> R,
    ) -> Result<R, FleetError> {
        let mut ship = self
            .world
            .get::<&mut Ship>(entity)
            .map_err(|_| FleetError::NoSuchShip(entity))?;
        Ok(f(&mut *ship))
    }
}

impl Default for FleetEngine {
    fn default() -> Self {
        Self::new()
    }
}

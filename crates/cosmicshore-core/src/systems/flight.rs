//! Flight system - ticks every ship once per frame

use std::collections::HashSet;

use hecs::{Entity, World};

use cosmicshore_logic::control::ShipControl;
use cosmicshore_logic::input::TickInput;
use cosmicshore_logic::motion::DegenerateDirectionWarning;
use cosmicshore_logic::ship::EffectSink;

use crate::components::{PilotInput, Ship};

/// Ships currently flying under at least one throttle debuff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlowedRegistry {
    slowed: HashSet<Entity>,
    degenerate_courses: u64,
}

impl SlowedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slowed.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.slowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slowed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slowed.iter().copied()
    }

    /// Total degenerate-course warnings seen across the fleet.
    pub fn degenerate_courses(&self) -> u64 {
        self.degenerate_courses
    }

    pub fn remove(&mut self, entity: Entity) {
        self.slowed.remove(&entity);
    }

    /// Sink that records effects for one ship.
    pub fn sink_for(&mut self, entity: Entity) -> ShipEffects<'_> {
        ShipEffects {
            registry: self,
            entity,
        }
    }
}

/// [`EffectSink`] bound to a single ship of the registry.
pub struct ShipEffects<'a> {
    registry: &'a mut SlowedRegistry,
    entity: Entity,
}

impl EffectSink for ShipEffects<'_> {
    fn slowed_changed(&mut self, slowed: bool) {
        if slowed {
            self.registry.slowed.insert(self.entity);
        } else {
            self.registry.slowed.remove(&self.entity);
        }
    }

    fn degenerate_course(&mut self, _warning: DegenerateDirectionWarning) {
        self.registry.degenerate_courses += 1;
    }
}

/// Advance every ship with pilot input by `delta_seconds`.
///
/// Returns the number of ships ticked.
pub fn flight_system(
    world: &mut World,
    registry: &mut SlowedRegistry,
    delta_seconds: f32,
) -> usize {
    let mut ticked = 0;
    for (entity, (ship, input)) in world.query_mut::<(&mut Ship, &PilotInput)>() {
        let tick = TickInput {
            delta_time: delta_seconds,
            ..input.0
        };
        ship.control.tick(&tick, &mut registry.sink_for(entity));
        ticked += 1;
    }
    ticked
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmicshore_logic::control::LocalShip;
    use cosmicshore_logic::motion::Pose;
    use cosmicshore_logic::tuning::ShipTuning;

    fn spawn(world: &mut World, throttle: Option<f32>) -> Entity {
        let ship = Ship {
            control: LocalShip::new(ShipTuning::default(), Pose::default()),
            class: None,
        };
        let input = PilotInput(TickInput {
            throttle,
            ..TickInput::new(0.0)
        });
        world.spawn((ship, input))
    }

    #[test]
    fn test_flight_system_moves_ships() {
        let mut world = World::new();
        let mut registry = SlowedRegistry::new();
        let a = spawn(&mut world, Some(1.0));
        let b = spawn(&mut world, None);

        for _ in 0..60 {
            assert_eq!(flight_system(&mut world, &mut registry, 1.0 / 60.0), 2);
        }

        let moved = world.get::<&Ship>(a).unwrap().control.pose().position;
        let held = world.get::<&Ship>(b).unwrap().control.pose().position;
        assert!(moved.z > 0.0);
        assert_eq!(held, glam::Vec3::ZERO);
    }

    #[test]
    fn test_ships_without_input_are_skipped() {
        let mut world = World::new();
        let mut registry = SlowedRegistry::new();
        world.spawn((Ship {
            control: LocalShip::new(ShipTuning::default(), Pose::default()),
            class: None,
        },));
        assert_eq!(flight_system(&mut world, &mut registry, 0.1), 0);
    }

    #[test]
    fn test_registry_tracks_slowed_ships() {
        let mut world = World::new();
        let mut registry = SlowedRegistry::new();
        let a = spawn(&mut world, Some(1.0));
        spawn(&mut world, Some(1.0));

        world
            .get::<&mut Ship>(a)
            .unwrap()
            .control
            .kinematics_mut()
            .add_throttle_modifier(0.5, 0.5)
            .unwrap();

        flight_system(&mut world, &mut registry, 0.25);
        assert!(registry.contains(a));
        assert_eq!(registry.len(), 1);

        flight_system(&mut world, &mut registry, 0.25);
        assert!(registry.is_empty());
    }
}

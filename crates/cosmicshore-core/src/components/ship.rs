//! Ship components.

use cosmicshore_logic::control::LocalShip;
use cosmicshore_logic::input::TickInput;
use cosmicshore_logic::tuning::ShipClass;

/// A flyable ship and its control state.
#[derive(Debug, Clone)]
pub struct Ship {
    pub control: LocalShip,
    /// Preset it was spawned from, `None` for custom tuning.
    pub class: Option<ShipClass>,
}

/// Latest input from whoever pilots the ship.
///
/// `delta_time` is overwritten by the engine's scaled frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PilotInput(pub TickInput);

impl Default for PilotInput {
    fn default() -> Self {
        Self(TickInput::new(0.0))
    }
}

/// Display name, for logs and harness output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShipName(pub String);

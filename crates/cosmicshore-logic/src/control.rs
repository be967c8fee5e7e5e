//! Ship control capability: locally piloted ships and replicated mirrors.
//!
//! Both kinds of ship answer the same [`ShipControl`] calls, so input
//! routing does not care who owns a ship. A [`LocalShip`] turns control
//! events into held flags merged into each tick's input. A [`RemoteShip`]
//! ignores control events and dead-reckons from the last
//! [`KinematicSnapshot`] its owner sent.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{ControlEvent, TickInput};
use crate::motion::{advance, Pose};
use crate::ship::{EffectSink, ShipKinematics};
use crate::tuning::ShipTuning;

/// Replicated motion state of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicSnapshot {
    pub position: Vec3,
    pub orientation: Quat,
    pub speed: f32,
    pub course: Vec3,
    pub velocity_shift: Vec3,
}

/// What a control event does to a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipAction {
    Boost,
    /// Hold the current course while the nose turns freely.
    Drift,
    /// Build charge while held, discharge on release.
    ChargeBoost,
    FlatSpin,
    Gyro,
}

pub trait ShipControl {
    /// Place the ship at `spawn` with a clean kinematic state.
    fn initialize(&mut self, spawn: Pose, sink: &mut dyn EffectSink);
    fn perform_action(&mut self, event: ControlEvent);
    fn stop_action(&mut self, event: ControlEvent);
    /// Advance one tick and return the new pose.
    fn tick(&mut self, input: &TickInput, sink: &mut dyn EffectSink) -> Pose;
    fn pose(&self) -> Pose;
}

fn default_bindings() -> HashMap<ControlEvent, ShipAction> {
    HashMap::from([
        (ControlEvent::Boost, ShipAction::Boost),
        (ControlEvent::Drift, ShipAction::Drift),
        (ControlEvent::ChargedBoost, ShipAction::ChargeBoost),
        (ControlEvent::FlatSpin, ShipAction::FlatSpin),
        (ControlEvent::Gyro, ShipAction::Gyro),
    ])
}

/// Flags held between ticks by control events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct HeldActions {
    boosting: bool,
    drifting: bool,
    charging: bool,
    discharge_pending: bool,
    gyro: bool,
}

/// A ship flown by this host.
#[derive(Debug, Clone)]
pub struct LocalShip {
    kinematics: ShipKinematics,
    bindings: HashMap<ControlEvent, ShipAction>,
    held: HeldActions,
}

impl LocalShip {
    pub fn new(tuning: ShipTuning, spawn: Pose) -> Self {
        Self {
            kinematics: ShipKinematics::new(tuning, spawn),
            bindings: default_bindings(),
            held: HeldActions::default(),
        }
    }

    pub fn kinematics(&self) -> &ShipKinematics {
        &self.kinematics
    }

    pub fn kinematics_mut(&mut self) -> &mut ShipKinematics {
        &mut self.kinematics
    }

    /// Route `event` to `action`, replacing any existing binding.
    pub fn bind(&mut self, event: ControlEvent, action: ShipAction) {
        self.bindings.insert(event, action);
    }

    pub fn unbind(&mut self, event: ControlEvent) {
        self.bindings.remove(&event);
    }

    pub fn binding(&self, event: ControlEvent) -> Option<ShipAction> {
        self.bindings.get(&event).copied()
    }

    pub fn snapshot(&self) -> KinematicSnapshot {
        let pose = self.kinematics.pose();
        let state = self.kinematics.state();
        KinematicSnapshot {
            position: pose.position,
            orientation: pose.orientation,
            speed: state.speed,
            course: state.course,
            velocity_shift: state.velocity_shift,
        }
    }

    /// Merge held action flags into the host's input.
    fn merged(&mut self, input: &TickInput) -> TickInput {
        let discharge = std::mem::take(&mut self.held.discharge_pending);
        TickInput {
            boosting: input.boosting || self.held.boosting,
            drifting: input.drifting || self.held.drifting,
            charging_boost: input.charging_boost || self.held.charging,
            charged_boost_discharging: input.charged_boost_discharging || discharge,
            gyro_enabled: input.gyro_enabled || self.held.gyro,
            ..*input
        }
    }
}

impl ShipControl for LocalShip {
    fn initialize(&mut self, spawn: Pose, sink: &mut dyn EffectSink) {
        self.held = HeldActions::default();
        self.kinematics.reset(sink);
        self.kinematics.teleport(spawn);
    }

    fn perform_action(&mut self, event: ControlEvent) {
        let Some(action) = self.binding(event) else {
            return;
        };
        match action {
            ShipAction::Boost => self.held.boosting = true,
            ShipAction::Drift => self.held.drifting = true,
            ShipAction::ChargeBoost => self.held.charging = true,
            ShipAction::FlatSpin => self.kinematics.orientation_mut().flat_spin(),
            ShipAction::Gyro => self.held.gyro = true,
        }
    }

    fn stop_action(&mut self, event: ControlEvent) {
        let Some(action) = self.binding(event) else {
            return;
        };
        match action {
            ShipAction::Boost => self.held.boosting = false,
            ShipAction::Drift => self.held.drifting = false,
            ShipAction::ChargeBoost => {
                self.held.charging = false;
                self.held.discharge_pending = true;
            }
            ShipAction::FlatSpin => {}
            ShipAction::Gyro => self.held.gyro = false,
        }
    }

    fn tick(&mut self, input: &TickInput, sink: &mut dyn EffectSink) -> Pose {
        let input = self.merged(input);
        self.kinematics.tick(&input, sink).pose
    }

    fn pose(&self) -> Pose {
        self.kinematics.pose()
    }
}

/// A ship owned by another host, mirrored from its snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteShip {
    snapshot: KinematicSnapshot,
}

impl RemoteShip {
    pub fn new(snapshot: KinematicSnapshot) -> Self {
        Self { snapshot }
    }

    /// Replace the mirrored state with a fresh snapshot.
    pub fn apply_snapshot(&mut self, snapshot: KinematicSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &KinematicSnapshot {
        &self.snapshot
    }
}

impl ShipControl for RemoteShip {
    fn initialize(&mut self, spawn: Pose, _sink: &mut dyn EffectSink) {
        self.snapshot = KinematicSnapshot {
            position: spawn.position,
            orientation: spawn.orientation,
            speed: 0.0,
            course: spawn.forward(),
            velocity_shift: Vec3::ZERO,
        };
    }

    // The owning host drives actions.
    fn perform_action(&mut self, _event: ControlEvent) {}

    fn stop_action(&mut self, _event: ControlEvent) {}

    fn tick(&mut self, input: &TickInput, sink: &mut dyn EffectSink) -> Pose {
        let step = advance(
            &self.pose(),
            self.snapshot.speed,
            self.snapshot.course,
            self.snapshot.velocity_shift,
            input.delta_time.max(0.0),
        );
        if let Some(warning) = step.degenerate {
            sink.degenerate_course(warning);
        }
        self.snapshot.position = step.pose.position;
        step.pose
    }

    fn pose(&self) -> Pose {
        Pose::new(self.snapshot.position, self.snapshot.orientation)
    }
}

//! Schedulable entities: players driven by a command queue and autonomous
//! creatures driven by AI dispatch.

use crate::action::ActionQueue;
use crate::energy::{EnergyAccount, Speed};
use crate::policy::{BehaviorProfile, EntityCategory};
use crate::state::{EntityId, Incapacitation, RegionId, Tick, TimeEffects};
use crate::time::TimeFactor;

/// Transport state of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connection {
    Connected,
    Disconnected,
}

/// Capability set: how the entity decides what to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
    /// Player: executes commands from its queue.
    Commanded {
        queue: ActionQueue,
        connection: Connection,
    },
    /// Creature: asks the AI dispatcher once per turn.
    Autonomous,
}

impl Control {
    pub fn commanded() -> Self {
        Self::Commanded {
            queue: ActionQueue::new(),
            connection: Connection::Connected,
        }
    }
}

/// Where an entity stands in the tick lifecycle.
///
/// Anything other than `Active` is a tombstone: the entity stays in its
/// region's table until the end-of-tick deferred step so nothing iterating
/// the table mid-tick is invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Dead,
    Disconnecting,
    Transitioning { to: RegionId },
}

/// Spawn parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitySpec {
    pub category: EntityCategory,
    pub region: RegionId,
    pub speed: Speed,
    pub energy: u32,
    pub commanded: bool,
}

impl EntitySpec {
    pub fn player(region: RegionId) -> Self {
        Self {
            category: EntityCategory::Player,
            region,
            speed: Speed::NORMAL,
            energy: 0,
            commanded: true,
        }
    }

    pub fn creature(category: EntityCategory, region: RegionId) -> Self {
        Self {
            category,
            region,
            speed: Speed::NORMAL,
            energy: 0,
            commanded: false,
        }
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_energy(mut self, energy: u32) -> Self {
        self.energy = energy;
        self
    }
}

/// A player or creature owned by its region's entity table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub category: EntityCategory,
    pub profile: BehaviorProfile,
    pub control: Control,
    pub speed: Speed,
    pub account: EnergyAccount,
    pub region: RegionId,
    pub status: Incapacitation,
    pub time_effects: TimeEffects,
    pub running: bool,
    /// Tick at which the entity last became unable to act.
    pub idle_since: Option<Tick>,
    /// Derived each energize phase; never persisted.
    pub time_bubble_factor: TimeFactor,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) acted: bool,
    pub(crate) can_act: bool,
}

impl Entity {
    pub fn new(id: EntityId, spec: &EntitySpec, profile: BehaviorProfile) -> Self {
        Self {
            id,
            category: spec.category,
            profile,
            control: if spec.commanded {
                Control::commanded()
            } else {
                Control::Autonomous
            },
            speed: spec.speed,
            account: EnergyAccount::with_energy(spec.energy),
            region: spec.region,
            status: Incapacitation::empty(),
            time_effects: TimeEffects::empty(),
            running: false,
            idle_since: None,
            time_bubble_factor: TimeFactor::NEUTRAL,
            lifecycle: Lifecycle::Active,
            acted: false,
            can_act: false,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.control, Control::Commanded { .. })
    }

    pub fn is_connected(&self) -> bool {
        match &self.control {
            Control::Commanded { connection, .. } => *connection == Connection::Connected,
            Control::Autonomous => true,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Still taking part in this tick (not dead, leaving, or moving region).
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn queue(&self) -> Option<&ActionQueue> {
        match &self.control {
            Control::Commanded { queue, .. } => Some(queue),
            Control::Autonomous => None,
        }
    }

    pub fn queue_mut(&mut self) -> Option<&mut ActionQueue> {
        match &mut self.control {
            Control::Commanded { queue, .. } => Some(queue),
            Control::Autonomous => None,
        }
    }

    /// Drops the connection and cancels every pending command.
    pub(crate) fn disconnect(&mut self) -> usize {
        match &mut self.control {
            Control::Commanded { queue, connection } => {
                *connection = Connection::Disconnected;
                queue.clear()
            }
            Control::Autonomous => 0,
        }
    }
}

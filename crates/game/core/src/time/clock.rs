//! Process-wide turn counters.
//!
//! The clock is owned by the scheduler and advanced only from the energize
//! phase. Hosts persist it through [`TurnClockSnapshot`] between ticks.

use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, Tick};

/// Per-entity turn counters.
///
/// `game_turn` counts every tick the entity was registered, `player_turn`
/// counts threshold crossings of its charge, `active_turn` counts ticks it was
/// not idle. `active_turn <= game_turn` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnCounters {
    pub game_turn: u64,
    pub player_turn: u64,
    pub active_turn: u64,
}

impl TurnCounters {
    /// True if `active_turn` does not exceed `game_turn`.
    pub const fn is_consistent(&self) -> bool {
        self.active_turn <= self.game_turn
    }
}

/// Persistable form of the clock.
///
/// Counters are listed in ascending entity order. A snapshot may hold
/// counters for players that are offline; they are picked up again when the
/// player is restored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnClockSnapshot {
    pub global_tick: Tick,
    pub counters: Vec<(EntityId, TurnCounters)>,
}

/// Errors restoring a clock from a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("entity {entity} has active_turn {active} above game_turn {game}")]
    ActiveExceedsGame { entity: EntityId, active: u64, game: u64 },

    #[error("entity {0} appears more than once in the snapshot")]
    DuplicateEntity(EntityId),

    #[error("snapshot tick {snapshot} is behind the live clock at {live}")]
    TickRewind { snapshot: Tick, live: Tick },
}

impl GameError for ClockError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActiveExceedsGame { .. } => "CLOCK_ACTIVE_EXCEEDS_GAME",
            Self::DuplicateEntity(_) => "CLOCK_DUPLICATE_ENTITY",
            Self::TickRewind { .. } => "CLOCK_TICK_REWIND",
        }
    }
}

/// The global tick plus every tracked entity's counters.
///
/// # Lifecycle
///
/// - `new` starts at tick zero for a fresh world.
/// - `from_snapshot` restores persisted state and validates it.
/// - `snapshot` captures the clock between ticks for saving.
///
/// The global tick never decreases, and each entity's counters only grow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnClock {
    global_tick: Tick,
    counters: BTreeMap<EntityId, TurnCounters>,
}

impl TurnClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a clock, rejecting snapshots that break counter invariants.
    pub fn from_snapshot(snapshot: TurnClockSnapshot) -> Result<Self, ClockError> {
        let mut counters = BTreeMap::new();
        for (entity, entry) in snapshot.counters {
            if !entry.is_consistent() {
                return Err(ClockError::ActiveExceedsGame {
                    entity,
                    active: entry.active_turn,
                    game: entry.game_turn,
                });
            }
            if counters.insert(entity, entry).is_some() {
                return Err(ClockError::DuplicateEntity(entity));
            }
        }

        Ok(Self {
            global_tick: snapshot.global_tick,
            counters,
        })
    }

    /// Captures the clock for persistence.
    pub fn snapshot(&self) -> TurnClockSnapshot {
        TurnClockSnapshot {
            global_tick: self.global_tick,
            counters: self
                .counters
                .iter()
                .map(|(id, counters)| (*id, *counters))
                .collect(),
        }
    }

    /// Number of ticks completed so far.
    pub fn global_tick(&self) -> Tick {
        self.global_tick
    }

    pub fn counters(&self, entity: EntityId) -> Option<TurnCounters> {
        self.counters.get(&entity).copied()
    }

    /// Every tracked entity in ascending id order.
    pub fn tracked(&self) -> impl Iterator<Item = (EntityId, &TurnCounters)> {
        self.counters.iter().map(|(id, counters)| (*id, counters))
    }

    /// Highest entity id with counters, used to keep id allocation ahead of
    /// restored entities.
    pub fn highest_entity(&self) -> Option<EntityId> {
        self.counters.keys().next_back().copied()
    }

    /// Starts tracking an entity, keeping restored counters if present.
    pub(crate) fn register(&mut self, entity: EntityId) {
        self.counters.entry(entity).or_default();
    }

    pub(crate) fn retire(&mut self, entity: EntityId) -> Option<TurnCounters> {
        self.counters.remove(&entity)
    }

    /// Advances the global tick by exactly one. Returns the new tick, or
    /// `None` on overflow.
    pub(crate) fn advance_global(&mut self) -> Option<Tick> {
        let next = self.global_tick.0.checked_add(1)?;
        self.global_tick = Tick(next);
        Some(self.global_tick)
    }

    /// Records one tick for an entity. Returns the updated counters, or
    /// `None` on overflow (the counters are left untouched).
    pub(crate) fn record_turn(
        &mut self,
        entity: EntityId,
        player_turns: u32,
        active: bool,
    ) -> Option<TurnCounters> {
        let current = self.counters.entry(entity).or_default();
        let next = TurnCounters {
            game_turn: current.game_turn.checked_add(1)?,
            player_turn: current.player_turn.checked_add(u64::from(player_turns))?,
            active_turn: current.active_turn.checked_add(u64::from(active))?,
        };
        *current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_turn_advances_independently() {
        let mut clock = TurnClock::new();
        clock.register(EntityId(1));

        clock.record_turn(EntityId(1), 0, true).unwrap();
        clock.record_turn(EntityId(1), 1, false).unwrap();
        let counters = clock.record_turn(EntityId(1), 2, true).unwrap();

        assert_eq!(
            counters,
            TurnCounters {
                game_turn: 3,
                player_turn: 3,
                active_turn: 2,
            }
        );
        assert!(counters.is_consistent());
    }

    #[test]
    fn snapshot_round_trip_preserves_counters() {
        let mut clock = TurnClock::new();
        clock.register(EntityId(4));
        clock.advance_global().unwrap();
        clock.record_turn(EntityId(4), 1, true).unwrap();

        let restored = TurnClock::from_snapshot(clock.snapshot()).unwrap();
        assert_eq!(restored, clock);
        assert_eq!(restored.global_tick(), Tick(1));
    }

    #[test]
    fn inconsistent_snapshot_is_rejected() {
        let snapshot = TurnClockSnapshot {
            global_tick: Tick(5),
            counters: vec![(
                EntityId(2),
                TurnCounters {
                    game_turn: 3,
                    player_turn: 0,
                    active_turn: 4,
                },
            )],
        };

        assert!(matches!(
            TurnClock::from_snapshot(snapshot),
            Err(ClockError::ActiveExceedsGame { .. })
        ));
    }

    #[test]
    fn duplicate_entities_are_rejected() {
        let snapshot = TurnClockSnapshot {
            global_tick: Tick(1),
            counters: vec![
                (EntityId(2), TurnCounters::default()),
                (EntityId(2), TurnCounters::default()),
            ],
        };

        assert_eq!(
            TurnClock::from_snapshot(snapshot),
            Err(ClockError::DuplicateEntity(EntityId(2)))
        );
    }

    #[test]
    fn register_keeps_restored_counters() {
        let snapshot = TurnClockSnapshot {
            global_tick: Tick(10),
            counters: vec![(
                EntityId(7),
                TurnCounters {
                    game_turn: 10,
                    player_turn: 1,
                    active_turn: 8,
                },
            )],
        };
        let mut clock = TurnClock::from_snapshot(snapshot).unwrap();
        clock.register(EntityId(7));

        assert_eq!(clock.counters(EntityId(7)).unwrap().game_turn, 10);
        assert_eq!(clock.highest_entity(), Some(EntityId(7)));
    }
}

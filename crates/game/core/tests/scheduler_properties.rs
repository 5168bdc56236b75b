use game_core::action::{ActionCost, ActionId, ActionOutcome, AiDecision, Command, QueuedAction};
use game_core::env::{FlatGenerator, InputBuffer};
use game_core::{
    ActionError, AiDispatcher, ClockError, CommandInterpreter, Entity, EntityCategory, EntityId,
    EntitySpec, Incapacitation, InputEvent, LevelGenerator, LifecycleObserver, Region,
    RegionFlags, RegionId, RegionSpec, RemovalReason, SchedulerConfig, SchedulerError,
    SightOracle, Speed, ThresholdStep, Tick, TickEnv, TickReport, TickScheduler, TimeEffect,
    TimeEffectKind, TimeFactor, TurnCounters, WorldEffects, WorldTickContext, WorldTickError,
    WorldTicker, energy_for_speed,
};

// ============================================================================
// Test collaborators
// ============================================================================

const COMPLETE: u32 = 1;
const TRAVEL: u32 = 2;
const DIE: u32 = 3;
const REJECT: u32 = 4;
const UNAVAILABLE: u32 = 5;

#[derive(Default)]
struct ScriptedCommands {
    executed: Vec<(EntityId, ActionId)>,
}

impl CommandInterpreter for ScriptedCommands {
    fn execute(
        &mut self,
        actor: &Entity,
        _region: &Region,
        action: &QueuedAction,
    ) -> Result<ActionOutcome, ActionError> {
        let outcome = match action.command.code {
            TRAVEL => ActionOutcome::ChangedRegion(RegionId(action.command.args[0] as u32)),
            DIE => ActionOutcome::Died,
            REJECT => return Err(ActionError::rejected(actor.id, "scripted rejection")),
            UNAVAILABLE => return Err(ActionError::Unavailable(actor.id)),
            _ => ActionOutcome::Completed,
        };
        self.executed.push((actor.id, action.id));
        Ok(outcome)
    }
}

#[derive(Default)]
struct ScriptedAi {
    eager: bool,
}

impl AiDispatcher for ScriptedAi {
    fn dispatch(&mut self, _actor: &Entity, _region: &Region) -> Result<AiDecision, ActionError> {
        if self.eager {
            Ok(AiDecision::Act {
                cost: ActionCost::Turn,
                outcome: ActionOutcome::Completed,
            })
        } else {
            Ok(AiDecision::Hold)
        }
    }
}

#[derive(Default)]
struct RecordingWorld {
    runs: Vec<(RegionId, WorldTickContext)>,
}

impl WorldTicker for RecordingWorld {
    fn run(&mut self, region: &Region, context: &WorldTickContext) -> Result<(), WorldTickError> {
        self.runs.push((region.id, *context));
        Ok(())
    }
}

#[derive(Default)]
struct Sight {
    hostile: bool,
}

impl SightOracle for Sight {
    fn hostile_in_view(&self, _entity: EntityId, _region: RegionId) -> bool {
        self.hostile
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Lifecycle {
    Changed(EntityId, RegionId, RegionId),
    Removed(EntityId, RemovalReason, Option<TurnCounters>),
    Emptied(RegionId),
}

#[derive(Default)]
struct RecordingObserver {
    events: Vec<Lifecycle>,
    claimed: Vec<RegionId>,
}

impl LifecycleObserver for RecordingObserver {
    fn on_region_emptied(&mut self, region: RegionId) {
        self.events.push(Lifecycle::Emptied(region));
    }

    fn on_entity_region_changed(&mut self, entity: EntityId, from: RegionId, to: RegionId) {
        self.events.push(Lifecycle::Changed(entity, from, to));
    }

    fn on_entity_removed(
        &mut self,
        entity: EntityId,
        reason: RemovalReason,
        counters: Option<TurnCounters>,
    ) {
        self.events.push(Lifecycle::Removed(entity, reason, counters));
    }

    fn has_persistent_claims(&self, region: RegionId) -> bool {
        self.claimed.contains(&region)
    }
}

/// Flat levels, unless told to refuse every request.
#[derive(Default)]
struct Generator {
    refuse: bool,
}

impl LevelGenerator for Generator {
    fn generate(&mut self, region: RegionId) -> Option<RegionSpec> {
        if self.refuse {
            None
        } else {
            FlatGenerator.generate(region)
        }
    }
}

#[derive(Default)]
struct Harness {
    input: InputBuffer,
    commands: ScriptedCommands,
    ai: ScriptedAi,
    world: RecordingWorld,
    sight: Sight,
    observer: RecordingObserver,
    generator: Generator,
}

impl Harness {
    fn tick(&mut self, scheduler: &mut TickScheduler) -> TickReport {
        let mut env = TickEnv {
            input: &mut self.input,
            commands: &mut self.commands,
            ai: &mut self.ai,
            world: &mut self.world,
            sight: &self.sight,
            observer: &mut self.observer,
            generator: &mut self.generator,
        };
        scheduler.tick(&mut env).expect("tick should succeed")
    }

    fn executed_by(&self, entity: EntityId) -> Vec<ActionId> {
        self.commands
            .executed
            .iter()
            .filter(|(actor, _)| *actor == entity)
            .map(|(_, action)| *action)
            .collect()
    }
}

fn scheduler_with(config: SchedulerConfig, regions: &[(u32, RegionSpec)]) -> TickScheduler {
    let mut scheduler = TickScheduler::new(config).unwrap();
    for (id, spec) in regions {
        scheduler.add_region(RegionId(*id), *spec).unwrap();
    }
    scheduler
}

fn scheduler(regions: &[(u32, RegionSpec)]) -> TickScheduler {
    scheduler_with(SchedulerConfig::default(), regions)
}

fn action(id: u64, code: u32, cost: ActionCost) -> QueuedAction {
    QueuedAction::new(ActionId(id), Command::new(code), cost)
}

// ============================================================================
// Global invariants
// ============================================================================

#[test]
fn global_tick_advances_by_exactly_one() {
    let mut empty = scheduler(&[]);
    let mut busy = scheduler(&[(1, RegionSpec::at_depth(1))]);
    for _ in 0..5 {
        busy.spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)))
            .unwrap();
    }
    let mut harness = Harness::default();
    harness.ai.eager = true;

    for expected in 1..=50 {
        let report = harness.tick(&mut empty);
        assert_eq!(report.tick.0, expected);
        assert_eq!(empty.global_tick().0, expected);

        harness.tick(&mut busy);
        assert_eq!(busy.global_tick().0, expected);
    }
}

#[test]
fn energy_never_exceeds_threshold_plus_one_frame() {
    let config = SchedulerConfig::default();
    let fastest = RegionSpec::at_depth(1)
        .with_time_factor(config.max_time_factor)
        .with_flags(RegionFlags::SAFE);
    let mut scheduler = scheduler_with(config.clone(), &[(1, fastest)]);
    let id = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)).with_speed(Speed::MAX))
        .unwrap();
    scheduler
        .apply_input(InputEvent::SetRunning {
            entity: id,
            running: true,
        })
        .unwrap();
    let mut harness = Harness::default();

    let ceiling = config.base_action_threshold
        + energy_for_speed(Speed::MAX) * config.max_time_factor / 100;
    let mut previous = 0;
    for _ in 0..500 {
        harness.tick(&mut scheduler);
        let state = scheduler.entity_energy_state(id).unwrap();
        assert!(state.energy <= ceiling, "energy {} above {ceiling}", state.energy);
        assert!(state.energy + state.extra_energy <= ceiling);
        assert!(state.energy >= previous, "energy decreased without acting");
        previous = state.energy;
    }
    assert_eq!(
        scheduler.entity(id).unwrap().time_bubble_factor,
        TimeFactor(config.max_time_factor)
    );
}

#[test]
fn active_turn_never_exceeds_game_turn() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)))
        .unwrap();
    let mut harness = Harness::default();

    scheduler
        .apply_input(InputEvent::SetStatus {
            entity: id,
            status: Incapacitation::PARALYZED,
        })
        .unwrap();
    for _ in 0..5 {
        harness.tick(&mut scheduler);
    }
    assert_eq!(
        scheduler.turn_counters(id),
        Some(TurnCounters {
            game_turn: 5,
            player_turn: 0,
            active_turn: 0,
        })
    );

    harness.input.push(InputEvent::SetStatus {
        entity: id,
        status: Incapacitation::empty(),
    });
    for _ in 0..3 {
        harness.tick(&mut scheduler);
        let counters = scheduler.turn_counters(id).unwrap();
        assert!(counters.active_turn <= counters.game_turn);
    }
    let counters = scheduler.turn_counters(id).unwrap();
    assert_eq!((counters.game_turn, counters.active_turn), (8, 3));
    // 80 energy of charge at threshold 100: no player turn yet.
    assert_eq!(counters.player_turn, 0);
}

#[test]
fn slowest_entity_is_never_starved() {
    let slow_zone = RegionSpec::at_depth(1).with_time_factor(1);
    let mut scheduler = scheduler(&[(1, slow_zone)]);
    let id = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Vermin, RegionId(1)).with_speed(Speed::MIN))
        .unwrap();
    let mut harness = Harness::default();

    for _ in 0..99 {
        harness.tick(&mut scheduler);
    }
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 99);

    harness.tick(&mut scheduler);
    let state = scheduler.entity_energy_state(id).unwrap();
    assert_eq!(state.energy, state.action_threshold);
}

#[test]
fn identical_players_act_in_the_same_tick() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let a = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    let b = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    scheduler
        .queue_action(a, action(1, COMPLETE, ActionCost::Turn).repeating(100))
        .unwrap();
    scheduler
        .queue_action(b, action(2, COMPLETE, ActionCost::Turn).repeating(100))
        .unwrap();
    let mut harness = Harness::default();

    let first = harness.tick(&mut scheduler);
    assert_eq!(first.player_actions, 2);

    for _ in 0..49 {
        let report = harness.tick(&mut scheduler);
        assert!(report.player_actions == 0 || report.player_actions == 2);
    }
    assert_eq!(harness.executed_by(a).len(), harness.executed_by(b).len());
    assert_eq!(harness.executed_by(a).len(), 5);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn normal_speed_acts_every_ten_ticks() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler.spawn(EntitySpec::player(RegionId(1))).unwrap();
    scheduler
        .queue_action(id, action(1, COMPLETE, ActionCost::Turn).repeating(1_000))
        .unwrap();
    let mut harness = Harness::default();

    let expected_interval = 100_u64.div_ceil(u64::from(energy_for_speed(Speed::NORMAL)));
    let acted: Vec<u64> = (0..100)
        .map(|_| harness.tick(&mut scheduler))
        .filter(|report| report.player_actions == 1)
        .map(|report| report.tick.0)
        .collect();

    assert_eq!(acted.first(), Some(&11));
    assert!(acted.windows(2).all(|w| w[1] - w[0] == expected_interval));
    assert_eq!(acted.len(), 9);
}

#[test]
fn half_rate_zone_grants_half_energy() {
    let mut scheduler = scheduler(&[
        (1, RegionSpec::at_depth(1)),
        (2, RegionSpec::at_depth(1).with_time_factor(50)),
    ]);
    let outside = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)))
        .unwrap();
    let inside = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(2)))
        .unwrap();
    let mut harness = Harness::default();

    harness.tick(&mut scheduler);

    let outside = scheduler.entity_energy_state(outside).unwrap().energy;
    let inside = scheduler.entity_energy_state(inside).unwrap().energy;
    assert_eq!(outside, 10);
    assert_eq!(inside * 2, outside);
}

#[test]
fn personal_slow_lasts_until_removed() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)))
        .unwrap();
    scheduler
        .apply_input(InputEvent::AddTimeEffect {
            entity: id,
            effect: TimeEffect {
                kind: TimeEffectKind::Slowed,
                percent: 50,
                expires_at: Tick(1_000),
            },
        })
        .unwrap();
    let mut harness = Harness::default();

    harness.tick(&mut scheduler);
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 5);

    harness.input.push(InputEvent::RemoveTimeEffect {
        entity: id,
        kind: TimeEffectKind::Slowed,
    });
    harness.tick(&mut scheduler);
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 15);
    assert!(scheduler.entity(id).unwrap().time_effects.is_empty());
}

#[test]
fn free_actions_chain_before_one_energy_action() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    for n in 1..=3 {
        scheduler
            .queue_action(id, action(n, COMPLETE, ActionCost::Free))
            .unwrap();
    }
    scheduler
        .queue_action(id, action(4, COMPLETE, ActionCost::Turn))
        .unwrap();
    let mut harness = Harness::default();

    let report = harness.tick(&mut scheduler);

    assert_eq!(report.free_actions, 3);
    assert_eq!(report.player_actions, 1);
    assert_eq!(
        harness.executed_by(id),
        vec![ActionId(1), ActionId(2), ActionId(3), ActionId(4)]
    );
    // 100 - 100 for the single energy action, then one tick of energize.
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 10);
}

#[test]
fn free_action_budget_is_bounded() {
    let config = SchedulerConfig {
        max_free_actions_per_tick: 2,
        ..SchedulerConfig::default()
    };
    let mut scheduler = scheduler_with(config, &[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    scheduler
        .queue_action(id, action(1, COMPLETE, ActionCost::Free).repeating(10))
        .unwrap();
    let mut harness = Harness::default();

    let report = harness.tick(&mut scheduler);
    assert_eq!(report.free_actions, 2);
    assert_eq!(report.player_actions, 0);
}

#[test]
fn emptied_region_is_released_only_after_the_tick() {
    let config = SchedulerConfig {
        world_tick_interval: 1,
        ..SchedulerConfig::default()
    };
    let mut scheduler = scheduler_with(config, &[(2, RegionSpec::at_depth(2))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(2)).with_energy(100))
        .unwrap();
    let travel = QueuedAction::new(
        ActionId(1),
        Command::new(TRAVEL).with_arg(3),
        ActionCost::Turn,
    );
    scheduler.queue_action(id, travel).unwrap();
    let mut harness = Harness::default();

    let report = harness.tick(&mut scheduler);

    // Mid-tick the world phase still saw the departed region.
    assert_eq!(harness.world.runs.len(), 1);
    assert_eq!(harness.world.runs[0].0, RegionId(2));

    assert_eq!(report.regions_created, vec![RegionId(3)]);
    assert_eq!(report.regions_released, vec![RegionId(2)]);
    assert!(scheduler.region(RegionId(2)).is_none());
    assert_eq!(scheduler.entity(id).unwrap().region, RegionId(3));
    assert_eq!(
        harness.observer.events,
        vec![
            Lifecycle::Changed(id, RegionId(2), RegionId(3)),
            Lifecycle::Emptied(RegionId(2)),
        ]
    );
}

#[test]
fn unavailable_destination_keeps_the_entity_and_retracts_the_move() {
    let mut scheduler = scheduler(&[(2, RegionSpec::at_depth(2))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(2)).with_energy(100))
        .unwrap();
    let travel = QueuedAction::new(
        ActionId(1),
        Command::new(TRAVEL).with_arg(9),
        ActionCost::Turn,
    );
    scheduler.queue_action(id, travel).unwrap();
    let mut harness = Harness::default();
    harness.generator.refuse = true;

    let report = harness.tick(&mut scheduler);

    assert!(report.transitions.is_empty());
    assert!(report.regions_created.is_empty());
    assert!(report.regions_released.is_empty());
    assert!(scheduler.region(RegionId(9)).is_none());

    let entity = scheduler.entity(id).unwrap();
    assert_eq!(entity.region, RegionId(2));
    assert!(entity.is_active());
    assert_eq!(
        harness.observer.events,
        vec![
            Lifecycle::Changed(id, RegionId(2), RegionId(9)),
            Lifecycle::Changed(id, RegionId(9), RegionId(2)),
        ]
    );

    // Skipped by energize while in flight, back to earning afterwards.
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 0);
    harness.tick(&mut scheduler);
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 10);
}

#[test]
fn moving_to_a_shallower_region_clamps_energy_to_its_ceiling() {
    let config = SchedulerConfig::default().with_threshold_curve(vec![ThresholdStep {
        min_depth: 10,
        threshold: 300,
    }]);
    let mut scheduler = scheduler_with(
        config,
        &[(20, RegionSpec::at_depth(20)), (1, RegionSpec::at_depth(1))],
    );
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(20)).with_energy(450))
        .unwrap();
    let travel = QueuedAction::new(
        ActionId(1),
        Command::new(TRAVEL).with_arg(1),
        ActionCost::Free,
    );
    scheduler.queue_action(id, travel).unwrap();
    let mut harness = Harness::default();

    let before = scheduler.entity_energy_state(id).unwrap();
    assert_eq!(before.action_threshold, 300);

    let report = harness.tick(&mut scheduler);
    assert_eq!(report.transitions.len(), 1);

    // 100 + one maximal frame (49 at 400%).
    let after = scheduler.entity_energy_state(id).unwrap();
    assert_eq!(after.action_threshold, 100);
    assert_eq!(after.energy, 296);
    assert_eq!(after.extra_energy, 0);
}

// ============================================================================
// Catch-up, failures, lifecycle
// ============================================================================

#[test]
fn catch_up_pass_spends_banked_energy() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    let mut harness = Harness::default();

    for _ in 0..20 {
        harness.tick(&mut scheduler);
    }
    let banked = scheduler.entity_energy_state(id).unwrap();
    assert_eq!(banked.energy, 100);
    assert_eq!(banked.extra_energy, 196);

    scheduler
        .queue_action(id, action(1, COMPLETE, ActionCost::Turn))
        .unwrap();
    let report = harness.tick(&mut scheduler);

    assert_eq!(report.catch_up_actions, 1);
    assert_eq!(report.player_actions, 0);
    let state = scheduler.entity_energy_state(id).unwrap();
    assert_eq!((state.energy, state.extra_energy), (196, 10));
}

#[test]
fn failing_action_is_isolated_and_costs_nothing() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let bad = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    let good = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    scheduler
        .queue_action(bad, action(1, REJECT, ActionCost::Turn))
        .unwrap();
    scheduler
        .queue_action(good, action(2, COMPLETE, ActionCost::Turn))
        .unwrap();
    let mut harness = Harness::default();

    let report = harness.tick(&mut scheduler);

    assert_eq!(report.failed_actions, 1);
    assert_eq!(report.player_actions, 1);
    assert_eq!(harness.executed_by(good), vec![ActionId(2)]);
    assert!(scheduler.entity(bad).unwrap().queue().unwrap().is_empty());
    assert_eq!(scheduler.entity_energy_state(bad).unwrap().energy, 100);
}

#[test]
fn transient_failure_keeps_the_action_queued() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    scheduler
        .queue_action(id, action(1, UNAVAILABLE, ActionCost::Turn))
        .unwrap();
    let mut harness = Harness::default();

    harness.tick(&mut scheduler);
    assert_eq!(scheduler.entity(id).unwrap().queue().unwrap().len(), 1);
}

#[test]
fn withdrawn_action_never_runs() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    let mut harness = Harness::default();
    harness.input.push(InputEvent::Queue {
        entity: id,
        action: action(1, COMPLETE, ActionCost::Turn),
    });
    harness.input.push(InputEvent::Withdraw {
        entity: id,
        action: ActionId(1),
    });

    let report = harness.tick(&mut scheduler);
    assert_eq!(report.player_actions, 0);
    assert!(harness.executed_by(id).is_empty());
}

#[test]
fn disconnect_cancels_queue_and_removes_after_tick() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)))
        .unwrap();
    let mut harness = Harness::default();
    harness.tick(&mut scheduler);

    scheduler
        .queue_action(id, action(1, COMPLETE, ActionCost::Turn))
        .unwrap();
    scheduler.disconnect(id).unwrap();
    assert!(scheduler.entity(id).unwrap().queue().unwrap().is_empty());

    let report = harness.tick(&mut scheduler);

    assert_eq!(report.removed, vec![(id, RemovalReason::Disconnected)]);
    assert!(scheduler.entity(id).is_none());
    assert!(harness.executed_by(id).is_empty());
    // The region still holds the creature.
    assert!(scheduler.region(RegionId(1)).is_some());

    let counters = scheduler.turn_counters(id).unwrap();
    assert_eq!(counters.game_turn, 1);
    assert_eq!(
        harness.observer.events,
        vec![Lifecycle::Removed(
            id,
            RemovalReason::Disconnected,
            Some(counters)
        )]
    );
}

#[test]
fn dead_creature_is_removed_and_counters_retired() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let player = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    scheduler
        .queue_action(player, action(1, DIE, ActionCost::Turn))
        .unwrap();
    let creature = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)))
        .unwrap();
    let mut harness = Harness::default();

    let report = harness.tick(&mut scheduler);

    assert_eq!(report.removed, vec![(player, RemovalReason::Died)]);
    assert!(scheduler.turn_counters(player).is_some());
    assert!(scheduler.turn_counters(creature).is_some());
    assert!(scheduler.region(RegionId(1)).is_some());
}

#[test]
fn persistent_regions_survive_when_empty() {
    let mut scheduler = scheduler(&[
        (1, RegionSpec::at_depth(1).with_flags(RegionFlags::PERSISTENT)),
        (2, RegionSpec::at_depth(2)),
        (3, RegionSpec::at_depth(3)),
    ]);
    let keeper = scheduler
        .spawn(EntitySpec::player(RegionId(1)).with_energy(100))
        .unwrap();
    let claimed = scheduler
        .spawn(EntitySpec::player(RegionId(2)).with_energy(100))
        .unwrap();
    for id in [keeper, claimed] {
        scheduler
            .queue_action(id, action(1, DIE, ActionCost::Turn))
            .unwrap();
    }
    let mut harness = Harness::default();
    harness.observer.claimed.push(RegionId(2));

    let report = harness.tick(&mut scheduler);

    assert!(report.regions_released.is_empty());
    assert!(scheduler.region(RegionId(1)).is_some());
    assert!(scheduler.region(RegionId(2)).is_some());
    // Never occupied, so never vacated.
    assert!(scheduler.region(RegionId(3)).is_some());
}

#[test]
fn running_is_stopped_when_a_hostile_is_in_view() {
    let mut scheduler = scheduler(&[
        (1, RegionSpec::at_depth(5)),
        (2, RegionSpec::surface().with_flags(RegionFlags::SAFE)),
    ]);
    let exposed = scheduler.spawn(EntitySpec::player(RegionId(1))).unwrap();
    let sheltered = scheduler.spawn(EntitySpec::player(RegionId(2))).unwrap();
    for id in [exposed, sheltered] {
        scheduler
            .apply_input(InputEvent::SetRunning {
                entity: id,
                running: true,
            })
            .unwrap();
    }
    let mut harness = Harness::default();
    harness.sight.hostile = true;

    harness.tick(&mut scheduler);

    let exposed = scheduler.entity(exposed).unwrap();
    assert!(!exposed.running);
    assert_eq!(exposed.account.energy(), 10);

    let sheltered = scheduler.entity(sheltered).unwrap();
    assert!(sheltered.running);
    assert_eq!(sheltered.time_bubble_factor, TimeFactor(200));
    assert_eq!(sheltered.account.energy(), 20);
}

#[test]
fn world_tick_runs_on_cadence_with_day_night_on_surface() {
    let config = SchedulerConfig {
        world_tick_interval: 10,
        day_length: 4,
        respawn_interval: 2,
        cleanup_interval: 3,
        structure_interval: 4,
        ..SchedulerConfig::default()
    };
    let mut scheduler = scheduler_with(
        config,
        &[(1, RegionSpec::surface()), (2, RegionSpec::at_depth(4))],
    );
    let mut harness = Harness::default();

    let world_ticks = (0..40)
        .map(|_| harness.tick(&mut scheduler))
        .filter(|report| report.world_tick)
        .count();
    assert_eq!(world_ticks, 4);

    let surface: Vec<_> = harness
        .world
        .runs
        .iter()
        .filter(|(region, _)| *region == RegionId(1))
        .map(|(_, context)| context)
        .collect();
    let flips: Vec<u64> = surface
        .iter()
        .filter(|context| context.effects.contains(WorldEffects::DAY_NIGHT))
        .map(|context| context.tick.0)
        .collect();
    assert_eq!(flips, vec![20, 40]);
    assert!(surface[0].is_day);
    assert!(!surface[1].is_day);

    let dungeon_flips = harness
        .world
        .runs
        .iter()
        .filter(|(region, context)| {
            *region == RegionId(2) && context.effects.contains(WorldEffects::DAY_NIGHT)
        })
        .count();
    assert_eq!(dungeon_flips, 0);

    let fourth = surface[3];
    assert_eq!(fourth.world_tick, 4);
    assert!(fourth.effects.contains(
        WorldEffects::TRAP_DECAY | WorldEffects::RESPAWN | WorldEffects::STRUCTURES
    ));
    assert!(!fourth.effects.contains(WorldEffects::CLEANUP));
}

#[test]
fn eager_creatures_act_once_per_turn() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Beast, RegionId(1)).with_energy(100))
        .unwrap();
    let mut harness = Harness::default();
    harness.ai.eager = true;

    let report = harness.tick(&mut scheduler);
    assert_eq!(report.creature_actions, 1);
    assert_eq!(scheduler.entity_energy_state(id).unwrap().energy, 10);

    let acted = (0..30)
        .map(|_| harness.tick(&mut scheduler))
        .filter(|report| report.creature_actions == 1)
        .count();
    assert_eq!(acted, 3);
}

// ============================================================================
// Persistence hooks and configuration
// ============================================================================

#[test]
fn turn_counters_survive_save_and_load() {
    let mut first = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let id = first.spawn(EntitySpec::player(RegionId(1))).unwrap();
    let mut harness = Harness::default();
    for _ in 0..15 {
        harness.tick(&mut first);
    }
    let snapshot = first.save_turn_counters();

    let mut second = scheduler(&[(1, RegionSpec::at_depth(1))]);
    second.load_turn_counters(snapshot.clone()).unwrap();
    second
        .restore_entity(id, EntitySpec::player(RegionId(1)))
        .unwrap();
    assert_eq!(second.turn_counters(id), first.turn_counters(id));

    harness.tick(&mut second);
    assert_eq!(second.global_tick().0, 16);
    let counters = second.turn_counters(id).unwrap();
    assert_eq!(counters.game_turn, 16);
    assert_eq!(counters.player_turn, 1);

    let fresh = second.spawn(EntitySpec::player(RegionId(1))).unwrap();
    assert!(fresh > id);

    assert_eq!(
        second.load_turn_counters(snapshot),
        Err(SchedulerError::Clock(ClockError::TickRewind {
            snapshot: game_core::Tick(15),
            live: game_core::Tick(16),
        }))
    );
}

#[test]
fn invalid_config_never_builds_a_scheduler() {
    let config = SchedulerConfig {
        base_action_threshold: 0,
        ..SchedulerConfig::default()
    };
    assert!(TickScheduler::new(config).is_err());
}

#[test]
fn input_for_unknown_or_autonomous_entities_is_rejected() {
    let mut scheduler = scheduler(&[(1, RegionSpec::at_depth(1))]);
    let creature = scheduler
        .spawn(EntitySpec::creature(EntityCategory::Undead, RegionId(1)))
        .unwrap();

    assert_eq!(
        scheduler.queue_action(EntityId(99), action(1, COMPLETE, ActionCost::Turn)),
        Err(SchedulerError::UnknownEntity(EntityId(99)))
    );
    assert_eq!(
        scheduler.queue_action(creature, action(1, COMPLETE, ActionCost::Turn)),
        Err(SchedulerError::NotCommanded(creature))
    );
    assert_eq!(
        scheduler.spawn(EntitySpec::player(RegionId(7))),
        Err(SchedulerError::UnknownRegion(RegionId(7)))
    );
}

//! Collaborator interfaces consumed by the scheduler.
//!
//! Everything the scheduler does not own (transport input, command
//! semantics, AI, world side effects, sight, level generation, persistence
//! reactions) sits behind a trait here. [`TickEnv`] borrows one of each for
//! the duration of a single tick; [`Collaborators`] owns a boxed set for hosts
//! that keep them across ticks.
mod actions;
mod input;
mod lifecycle;
mod noop;
mod world;

use crate::state::{EntityId, RegionId};

pub use actions::{ActionError, AiDispatcher, CommandInterpreter};
pub use input::{InputBuffer, InputEvent, InputSource};
pub use lifecycle::{LevelGenerator, LifecycleObserver, RemovalReason};
pub use noop::{
    FlatGenerator, IdleAi, NoopInput, NoopInterpreter, NoopObserver, NoopSight, NoopWorld,
};
pub use world::{WorldEffects, WorldTickContext, WorldTickError, WorldTicker};

/// Line-of-sight query used to gate the running bonus.
pub trait SightOracle: Send + Sync {
    /// True if a hostile entity is visible to `entity` inside `region`.
    fn hostile_in_view(&self, entity: EntityId, region: RegionId) -> bool;
}

/// Collaborators borrowed for one tick.
pub struct TickEnv<'a> {
    pub input: &'a mut dyn InputSource,
    pub commands: &'a mut dyn CommandInterpreter,
    pub ai: &'a mut dyn AiDispatcher,
    pub world: &'a mut dyn WorldTicker,
    pub sight: &'a dyn SightOracle,
    pub observer: &'a mut dyn LifecycleObserver,
    pub generator: &'a mut dyn LevelGenerator,
}

/// Owned collaborator set.
pub struct Collaborators {
    pub input: Box<dyn InputSource>,
    pub commands: Box<dyn CommandInterpreter>,
    pub ai: Box<dyn AiDispatcher>,
    pub world: Box<dyn WorldTicker>,
    pub sight: Box<dyn SightOracle>,
    pub observer: Box<dyn LifecycleObserver>,
    pub generator: Box<dyn LevelGenerator>,
}

impl Collaborators {
    /// Collaborators for an empty world: commands complete, creatures hold.
    pub fn noop() -> Self {
        Self {
            input: Box::new(NoopInput),
            commands: Box::new(NoopInterpreter),
            ai: Box::new(IdleAi),
            world: Box::new(NoopWorld),
            sight: Box::new(NoopSight),
            observer: Box::new(NoopObserver),
            generator: Box::new(FlatGenerator),
        }
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_commands(mut self, commands: impl CommandInterpreter + 'static) -> Self {
        self.commands = Box::new(commands);
        self
    }

    pub fn with_ai(mut self, ai: impl AiDispatcher + 'static) -> Self {
        self.ai = Box::new(ai);
        self
    }

    pub fn with_world(mut self, world: impl WorldTicker + 'static) -> Self {
        self.world = Box::new(world);
        self
    }

    pub fn with_sight(mut self, sight: impl SightOracle + 'static) -> Self {
        self.sight = Box::new(sight);
        self
    }

    pub fn with_observer(mut self, observer: impl LifecycleObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_generator(mut self, generator: impl LevelGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Borrows the set for one tick.
    pub fn env(&mut self) -> TickEnv<'_> {
        TickEnv {
            input: self.input.as_mut(),
            commands: self.commands.as_mut(),
            ai: self.ai.as_mut(),
            world: self.world.as_mut(),
            sight: self.sight.as_ref(),
            observer: self.observer.as_mut(),
            generator: self.generator.as_mut(),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::noop()
    }
}

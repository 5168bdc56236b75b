//! Entity categories and the behaviour coefficients they resolve into.

use crate::config::SchedulerConfig;

/// Broad classification of an entity, fixed at spawn time.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Player,
    Beast,
    Humanoid,
    Undead,
    Construct,
    Elemental,
    Vermin,
}

/// Behaviour coefficients resolved once per entity so the hot path never
/// inspects the category again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BehaviorProfile {
    /// Chance (percent) to act despite a blocking status, rolled every tick.
    pub override_chance: u8,
}

/// Lookup from category to [`BehaviorProfile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTable {
    profiles: [BehaviorProfile; CATEGORY_COUNT],
}

const CATEGORY_COUNT: usize = 7;

impl CategoryTable {
    /// Built-in coefficients: mindless or alien creatures shrug off some of
    /// what stops living minds.
    pub fn builtin() -> Self {
        let mut table = Self {
            profiles: [BehaviorProfile::default(); CATEGORY_COUNT],
        };
        table.set(EntityCategory::Undead, 25);
        table.set(EntityCategory::Construct, 50);
        table.set(EntityCategory::Elemental, 33);
        table
    }

    /// Built-in table with the config's overrides applied.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let mut table = Self::builtin();
        for entry in &config.category_overrides {
            table.set(entry.category, entry.chance);
        }
        table
    }

    /// Profile assigned to entities of `category` at spawn.
    pub fn profile(&self, category: EntityCategory) -> BehaviorProfile {
        self.profiles[category as usize]
    }

    fn set(&mut self, category: EntityCategory, override_chance: u8) {
        self.profiles[category as usize] = BehaviorProfile {
            override_chance: override_chance.min(100),
        };
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn table_covers_every_category() {
        assert_eq!(EntityCategory::iter().count(), CATEGORY_COUNT);
        let table = CategoryTable::builtin();
        for category in EntityCategory::iter() {
            assert!(table.profile(category).override_chance <= 100);
        }
    }

    #[test]
    fn players_never_override() {
        let table = CategoryTable::builtin();
        assert_eq!(table.profile(EntityCategory::Player).override_chance, 0);
    }

    #[test]
    fn config_overrides_builtin_values() {
        let config = SchedulerConfig::default()
            .with_category_override(EntityCategory::Beast, 10)
            .with_category_override(EntityCategory::Construct, 0);
        let table = CategoryTable::from_config(&config);

        assert_eq!(table.profile(EntityCategory::Beast).override_chance, 10);
        assert_eq!(table.profile(EntityCategory::Construct).override_chance, 0);
        assert_eq!(table.profile(EntityCategory::Undead).override_chance, 25);
    }

    #[test]
    fn category_names_are_snake_case() {
        assert_eq!(EntityCategory::Vermin.to_string(), "vermin");
    }
}

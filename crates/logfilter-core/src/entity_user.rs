//! Entity/user filter
//!
//! Owns the `entity -> (user -> visible)` map, the scenario definition, the
//! detected test entity and the ERROR override. Group toggles (ALL,
//! SCENARIO, TEST) share one rule: read the group's aggregate, do nothing
//! if it is disabled, otherwise set every member to its negation. A mixed
//! group therefore turns fully on first.

use crate::config::FilterConfig;
use crate::entry::{LogEntry, PairKey};
use crate::index::LogEntryIndex;
use crate::visibility::Tristate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Summary of a group of pair visibilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateState {
    /// Every pair in the group is visible
    Shown,
    /// At least one pair in the group is hidden
    Hidden,
    /// The group is empty; clicks are ignored
    Disabled,
}

impl AggregateState {
    /// Aggregate a group of visibilities
    #[must_use]
    pub fn of(values: impl IntoIterator<Item = bool>) -> Self {
        let mut seen = false;
        for visible in values {
            if !visible {
                return Self::Hidden;
            }
            seen = true;
        }
        if seen {
            Self::Shown
        } else {
            Self::Disabled
        }
    }

    /// `Some(all visible)`, or `None` when disabled
    #[inline]
    #[must_use]
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Shown => Some(true),
            Self::Hidden => Some(false),
            Self::Disabled => None,
        }
    }
}

/// Visibility per (entity, user), in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityUserState {
    entities: IndexMap<String, IndexMap<String, bool>>,
}

impl EntityUserState {
    /// Every pair observed in the index, visible
    #[must_use]
    pub fn from_index(index: &LogEntryIndex) -> Self {
        let mut state = Self::default();
        for pair in index.pairs() {
            state
                .entities
                .entry(pair.entity.clone())
                .or_default()
                .insert(pair.user.clone(), true);
        }
        state
    }

    /// Visibility of one pair
    #[must_use]
    pub fn get(&self, entity: &str, user: &str) -> Option<bool> {
        self.entities.get(entity)?.get(user).copied()
    }

    /// Whether the pair exists
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: &str, user: &str) -> bool {
        self.get(entity, user).is_some()
    }

    /// Set one existing pair; returns the previous value
    pub fn set(&mut self, entity: &str, user: &str, visible: bool) -> Option<bool> {
        let slot = self.entities.get_mut(entity)?.get_mut(user)?;
        Some(std::mem::replace(slot, visible))
    }

    /// Users of one entity
    #[must_use]
    pub fn users(&self, entity: &str) -> Option<&IndexMap<String, bool>> {
        self.entities.get(entity)
    }

    /// Entity names in first-seen order
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// All pairs with their visibility
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.entities.iter().flat_map(|(entity, users)| {
            users
                .iter()
                .map(move |(user, &visible)| (entity.as_str(), user.as_str(), visible))
        })
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.values().map(IndexMap::len).sum()
    }

    /// Check if there are no pairs
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_all_visible(&mut self) {
        for users in self.entities.values_mut() {
            users.values_mut().for_each(|v| *v = true);
        }
    }
}

/// Ordered pairs making up the test scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioDefinition {
    pairs: Vec<PairKey>,
}

impl ScenarioDefinition {
    /// Scenario for a detected test entity
    ///
    /// Without a test entity the scenario is empty, which keeps the
    /// SCENARIO aggregate disabled.
    #[must_use]
    pub fn build(config: &FilterConfig, test_entity: Option<&str>) -> Self {
        let Some(test_entity) = test_entity else {
            return Self::default();
        };

        let pairs = config
            .scenario_test_users
            .iter()
            .map(|user| PairKey::new(test_entity, user.as_str()))
            .chain(config.scenario_fixed_pairs.iter().cloned())
            .collect();
        Self { pairs }
    }

    /// Scenario pairs in definition order
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[PairKey] {
        &self.pairs
    }

    /// Whether the pair belongs to the scenario
    #[must_use]
    pub fn contains(&self, entity: &str, user: &str) -> bool {
        self.pairs
            .iter()
            .any(|p| p.entity == entity && p.user == user)
    }
}

/// Entity/user-dimension filter
#[derive(Debug, Clone)]
pub struct EntityUserFilter {
    state: EntityUserState,
    scenario: ScenarioDefinition,
    test_entity: Option<String>,
    error_override: bool,
}

impl EntityUserFilter {
    /// Build filter state from the loaded index
    #[must_use]
    pub fn new(index: &LogEntryIndex, config: &FilterConfig) -> Self {
        let test_entity = index
            .detect_test_entity(&config.test_entity_marker_user)
            .map(str::to_string);
        if test_entity.is_none() {
            tracing::warn!(
                marker = %config.test_entity_marker_user,
                "test entity not found; TEST and SCENARIO stay disabled"
            );
        }

        Self {
            state: EntityUserState::from_index(index),
            scenario: ScenarioDefinition::build(config, test_entity.as_deref()),
            test_entity,
            error_override: config.error_override,
        }
    }

    /// Current pair visibilities
    #[inline]
    #[must_use]
    pub fn state(&self) -> &EntityUserState {
        &self.state
    }

    /// Scenario definition
    #[inline]
    #[must_use]
    pub fn scenario(&self) -> &ScenarioDefinition {
        &self.scenario
    }

    /// Detected test entity
    #[inline]
    #[must_use]
    pub fn test_entity(&self) -> Option<&str> {
        self.test_entity.as_deref()
    }

    /// Whether ERROR entries bypass this dimension
    #[inline]
    #[must_use]
    pub fn error_override(&self) -> bool {
        self.error_override
    }

    /// Aggregate over every pair
    #[must_use]
    pub fn all_state(&self) -> AggregateState {
        AggregateState::of(self.state.pairs().map(|(_, _, v)| v))
    }

    /// Aggregate over scenario pairs present in the state
    #[must_use]
    pub fn scenario_state(&self) -> AggregateState {
        AggregateState::of(
            self.scenario
                .pairs()
                .iter()
                .filter_map(|p| self.state.get(&p.entity, &p.user)),
        )
    }

    /// Aggregate over every user of the test entity
    #[must_use]
    pub fn test_state(&self) -> AggregateState {
        AggregateState::of(self.test_users().map(|(_, v)| v))
    }

    fn test_users(&self) -> impl Iterator<Item = (&str, bool)> {
        self.test_entity
            .as_deref()
            .and_then(|entity| self.state.users(entity))
            .into_iter()
            .flat_map(|users| users.iter().map(|(u, &v)| (u.as_str(), v)))
    }

    /// Flip one pair; unknown pairs are ignored
    ///
    /// Returns the changed pairs (empty or one element).
    pub fn toggle(&mut self, entity: &str, user: &str) -> Vec<PairKey> {
        let Some(current) = self.state.get(entity, user) else {
            tracing::debug!(entity, user, "toggle of unknown pair ignored");
            return Vec::new();
        };
        self.state.set(entity, user, !current);
        vec![PairKey::new(entity, user)]
    }

    /// Apply the group toggle rule to every pair
    pub fn toggle_all(&mut self) -> Vec<PairKey> {
        let group: Vec<PairKey> = self
            .state
            .pairs()
            .map(|(e, u, _)| PairKey::new(e, u))
            .collect();
        self.toggle_group(group)
    }

    /// Apply the group toggle rule to the scenario pairs
    pub fn toggle_scenario(&mut self) -> Vec<PairKey> {
        let group: Vec<PairKey> = self
            .scenario
            .pairs()
            .iter()
            .filter(|p| self.state.contains(&p.entity, &p.user))
            .cloned()
            .collect();
        self.toggle_group(group)
    }

    /// Apply the group toggle rule to the test entity's users
    pub fn toggle_test(&mut self) -> Vec<PairKey> {
        let Some(entity) = self.test_entity.clone() else {
            return Vec::new();
        };
        let group: Vec<PairKey> = self
            .test_users()
            .map(|(u, _)| PairKey::new(entity.as_str(), u))
            .collect();
        self.toggle_group(group)
    }

    /// Flip the ERROR override; returns the new value
    pub fn toggle_error_override(&mut self) -> bool {
        self.error_override = !self.error_override;
        self.error_override
    }

    /// Entity/user verdict for an entry under the current state
    #[must_use]
    pub fn verdict(&self, entry: &LogEntry) -> Tristate {
        match self.state.get(&entry.entity, &entry.user) {
            Some(visible) => {
                Tristate::from_visible(visible || (self.error_override && entry.level.is_error()))
            }
            None => Tristate::Unset,
        }
    }

    /// Restore every pair to visible and the override to its configured value
    pub fn reset(&mut self, config: &FilterConfig) {
        self.state.set_all_visible();
        self.error_override = config.error_override;
    }

    fn toggle_group(&mut self, group: Vec<PairKey>) -> Vec<PairKey> {
        let aggregate = AggregateState::of(
            group
                .iter()
                .filter_map(|p| self.state.get(&p.entity, &p.user)),
        );
        let Some(current) = aggregate.as_option() else {
            return Vec::new();
        };

        let target = !current;
        group
            .into_iter()
            .filter(|p| self.state.set(&p.entity, &p.user, target) == Some(!target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Level;

    fn index(rows: &[(&str, &str)]) -> LogEntryIndex {
        LogEntryIndex::from_entries(
            rows.iter()
                .map(|&(entity, user)| LogEntry::new(0, entity, user, Level::Info, 0)),
        )
    }

    fn session() -> LogEntryIndex {
        index(&[
            ("Tester", "Run"),
            ("t1", "TAPI Jumps"),
            ("t1", "Step"),
            ("t1", "Self"),
            ("Engine", "Self"),
        ])
    }

    #[test]
    fn aggregate_of() {
        assert_eq!(AggregateState::of([]), AggregateState::Disabled);
        assert_eq!(AggregateState::of([true, true]), AggregateState::Shown);
        assert_eq!(AggregateState::of([true, false]), AggregateState::Hidden);
    }

    #[test]
    fn state_defaults_visible() {
        let filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        assert_eq!(filter.state().len(), 5);
        assert_eq!(filter.all_state(), AggregateState::Shown);
        assert_eq!(filter.test_entity(), Some("t1"));
    }

    #[test]
    fn scenario_skips_missing_pairs() {
        let filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        // (t1, Artifact) is defined but absent
        assert_eq!(filter.scenario().pairs().len(), 4);
        assert_eq!(filter.scenario_state(), AggregateState::Shown);
    }

    #[test]
    fn toggle_single_pair() {
        let mut filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        let changed = filter.toggle("Engine", "Self");

        assert_eq!(changed, vec![PairKey::new("Engine", "Self")]);
        assert_eq!(filter.state().get("Engine", "Self"), Some(false));
        assert_eq!(filter.all_state(), AggregateState::Hidden);
        assert_eq!(filter.test_state(), AggregateState::Shown);
    }

    #[test]
    fn toggle_unknown_pair_is_noop() {
        let mut filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        assert!(filter.toggle("Nope", "Self").is_empty());
        assert_eq!(filter.all_state(), AggregateState::Shown);
    }

    #[test]
    fn mixed_group_turns_on_first() {
        let mut filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        filter.toggle("Engine", "Self");

        let changed = filter.toggle_all();
        assert_eq!(changed, vec![PairKey::new("Engine", "Self")]);
        assert_eq!(filter.all_state(), AggregateState::Shown);

        let changed = filter.toggle_all();
        assert_eq!(changed.len(), 5);
        assert!(filter.state().pairs().all(|(_, _, v)| !v));
    }

    #[test]
    fn toggle_scenario_touches_only_scenario() {
        let mut filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        let changed = filter.toggle_scenario();

        assert_eq!(changed.len(), 3);
        assert_eq!(filter.state().get("t1", "TAPI Jumps"), Some(true));
        assert_eq!(filter.state().get("Engine", "Self"), Some(true));
        assert_eq!(filter.state().get("Tester", "Run"), Some(false));
        assert_eq!(filter.scenario_state(), AggregateState::Hidden);
        assert_eq!(filter.test_state(), AggregateState::Hidden);
    }

    #[test]
    fn toggle_test_touches_test_entity() {
        let mut filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        let changed = filter.toggle_test();

        assert_eq!(changed.len(), 3);
        assert!(changed.iter().all(|p| p.entity == "t1"));
        assert_eq!(filter.state().get("Tester", "Run"), Some(true));
    }

    #[test]
    fn no_test_entity_disables_groups() {
        let mut filter =
            EntityUserFilter::new(&index(&[("Tester", "Run")]), &FilterConfig::default());

        assert_eq!(filter.test_entity(), None);
        assert_eq!(filter.test_state(), AggregateState::Disabled);
        assert_eq!(filter.scenario_state(), AggregateState::Disabled);
        assert!(filter.toggle_test().is_empty());
        assert!(filter.toggle_scenario().is_empty());
        assert_eq!(filter.state().get("Tester", "Run"), Some(true));
    }

    #[test]
    fn empty_index_disables_all() {
        let mut filter = EntityUserFilter::new(&LogEntryIndex::new(), &FilterConfig::default());
        assert_eq!(filter.all_state(), AggregateState::Disabled);
        assert!(filter.toggle_all().is_empty());
    }

    #[test]
    fn verdict_respects_error_override() {
        let mut filter = EntityUserFilter::new(&session(), &FilterConfig::default());
        let error = LogEntry::new(4, "Engine", "Self", Level::Error, 0);
        let info = LogEntry::new(4, "Engine", "Self", Level::Info, 0);

        filter.toggle("Engine", "Self");
        assert!(filter.error_override());
        assert_eq!(filter.verdict(&error), Tristate::Yes);
        assert_eq!(filter.verdict(&info), Tristate::No);

        assert!(!filter.toggle_error_override());
        assert_eq!(filter.verdict(&error), Tristate::No);
    }

    #[test]
    fn reset_restores_defaults() {
        let config = FilterConfig::default();
        let mut filter = EntityUserFilter::new(&session(), &config);
        filter.toggle_all();
        filter.toggle_error_override();

        filter.reset(&config);
        assert_eq!(filter.all_state(), AggregateState::Shown);
        assert!(filter.error_override());
    }
}

//! Derived button states
//!
//! Button states are a pure function of the entity/user filter. The
//! engine recomputes a full [`ButtonStates`] after every entity/user
//! mutation and reports which buttons differ from the previous snapshot.

use crate::config::FilterConfig;
use crate::entity_user::{AggregateState, EntityUserFilter};
use crate::entry::PairKey;
use serde::Serialize;

/// Identifies one button of the entity/user filter bar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKey {
    /// `#ALL`
    All,
    /// `#SCENARIO`
    Scenario,
    /// `#TEST`
    Test,
    /// `ERROR`
    ErrorOverride,
    /// One (entity, user) button
    Pair(PairKey),
}

/// Button for a single (entity, user) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairButton {
    /// Pair controlled by the button
    pub pair: PairKey,
    /// `entity:user`, with the test entity shortened
    pub label: String,
    /// Current visibility of the pair
    pub visible: bool,
}

/// Snapshot of every entity/user button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonStates {
    /// `#ALL`
    pub all: AggregateState,
    /// `#SCENARIO`
    pub scenario: AggregateState,
    /// `#TEST`
    pub test: AggregateState,
    /// `ERROR`
    pub error_override: bool,
    /// Per-pair buttons, ordered by label
    pub pairs: Vec<PairButton>,
}

impl ButtonStates {
    /// Keys whose state differs between `self` and `next`
    #[must_use]
    pub fn diff(&self, next: &ButtonStates) -> Vec<ButtonKey> {
        let mut keys = Vec::new();
        if self.all != next.all {
            keys.push(ButtonKey::All);
        }
        if self.scenario != next.scenario {
            keys.push(ButtonKey::Scenario);
        }
        if self.test != next.test {
            keys.push(ButtonKey::Test);
        }
        if self.error_override != next.error_override {
            keys.push(ButtonKey::ErrorOverride);
        }
        for (before, after) in self.pairs.iter().zip(&next.pairs) {
            if before.visible != after.visible {
                keys.push(ButtonKey::Pair(after.pair.clone()));
            }
        }
        keys
    }

    /// State of one pair button
    #[must_use]
    pub fn pair(&self, entity: &str, user: &str) -> Option<bool> {
        self.pairs
            .iter()
            .find(|b| b.pair.entity == entity && b.pair.user == user)
            .map(|b| b.visible)
    }
}

/// Computes button states from the entity/user filter
#[derive(Debug, Clone)]
pub struct AggregateButtonStateEngine {
    test_entity_label: String,
}

impl AggregateButtonStateEngine {
    /// Create engine from configuration
    #[must_use]
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            test_entity_label: config.test_entity_label.clone(),
        }
    }

    /// Full recomputation
    #[must_use]
    pub fn recompute(&self, filter: &EntityUserFilter) -> ButtonStates {
        ButtonStates {
            all: filter.all_state(),
            scenario: filter.scenario_state(),
            test: filter.test_state(),
            error_override: filter.error_override(),
            pairs: self.pair_buttons(filter),
        }
    }

    /// Per-pair buttons, sorted by displayed entity name then user
    #[must_use]
    pub fn pair_buttons(&self, filter: &EntityUserFilter) -> Vec<PairButton> {
        let test_entity = filter.test_entity();
        let mut buttons: Vec<(String, PairButton)> = filter
            .state()
            .pairs()
            .map(|(entity, user, visible)| {
                let shown = if Some(entity) == test_entity {
                    self.test_entity_label.clone()
                } else {
                    entity.to_string()
                };
                let label = format!("{shown}:{user}");
                let button = PairButton {
                    pair: PairKey::new(entity, user),
                    label,
                    visible,
                };
                (shown, button)
            })
            .collect();

        buttons.sort_by(|(a, x), (b, y)| a.cmp(b).then_with(|| x.pair.user.cmp(&y.pair.user)));
        buttons.into_iter().map(|(_, button)| button).collect()
    }
}

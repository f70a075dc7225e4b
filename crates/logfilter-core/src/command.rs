//! Commands dispatched to the filter engine and their outcomes

use crate::aggregate::{ButtonKey, ButtonStates};
use crate::entry::PairKey;
use serde::{Deserialize, Serialize};

/// One discrete user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterCommand {
    /// Hide the nested run of an entry
    Collapse {
        /// Parent entry
        entry: usize,
    },
    /// Show the nested run of an entry
    Expand {
        /// Parent entry
        entry: usize,
    },
    /// Show everything, then auto-collapse at `depth` (`None`: expand all)
    ResetAll {
        /// Depth to fold at
        depth: Option<u32>,
    },
    /// Flip one (entity, user) pair
    Toggle {
        /// Entity name
        entity: String,
        /// User name
        user: String,
    },
    /// `#ALL` button
    ToggleAll,
    /// `#SCENARIO` button
    ToggleScenario,
    /// `#TEST` button
    ToggleTest,
    /// `ERROR` button
    ToggleErrorOverride,
}

impl FilterCommand {
    /// Toggle command for a pair
    #[must_use]
    pub fn toggle(entity: impl Into<String>, user: impl Into<String>) -> Self {
        Self::Toggle {
            entity: entity.into(),
            user: user.into(),
        }
    }

    /// Whether the command acts on the entity/user dimension
    #[must_use]
    pub fn is_entity_user(&self) -> bool {
        !matches!(
            self,
            Self::Collapse { .. } | Self::Expand { .. } | Self::ResetAll { .. }
        )
    }
}

impl From<PairKey> for FilterCommand {
    fn from(pair: PairKey) -> Self {
        Self::Toggle {
            entity: pair.entity,
            user: pair.user,
        }
    }
}

/// Result of running one command to completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// Rows whose display state flipped, in sequence order
    pub changed_rows: Vec<usize>,
    /// Pairs whose visibility flag changed
    pub changed_pairs: Vec<PairKey>,
    /// Buttons whose state changed
    pub changed_buttons: Vec<ButtonKey>,
    /// Recomputed button states, when the entity/user dimension was touched
    pub buttons: Option<ButtonStates>,
}

impl CommandOutcome {
    /// Whether nothing observable changed
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed_rows.is_empty()
            && self.changed_pairs.is_empty()
            && self.changed_buttons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_json_shape() {
        let cmd: FilterCommand =
            serde_json::from_str(r#"{"op":"toggle","entity":"A","user":"X"}"#).unwrap();
        assert_eq!(cmd, FilterCommand::toggle("A", "X"));

        let json = serde_json::to_string(&FilterCommand::ResetAll { depth: None }).unwrap();
        assert_eq!(json, r#"{"op":"reset_all","depth":null}"#);
    }

    #[test]
    fn dimension_classification() {
        assert!(FilterCommand::ToggleErrorOverride.is_entity_user());
        assert!(FilterCommand::from(PairKey::new("A", "X")).is_entity_user());
        assert!(!FilterCommand::Collapse { entry: 0 }.is_entity_user());
    }
}

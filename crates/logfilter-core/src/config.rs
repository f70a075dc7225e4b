//! Fixed filter configuration
//!
//! The viewer ships with one configuration; it is modelled as data so the
//! rendering side (and tests) can load it from a file.

use crate::entry::PairKey;
use serde::{Deserialize, Serialize};

/// Configuration consumed by the filter engine at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Users never subject to nesting folds
    pub nest_ignored_users: Vec<String>,
    /// User whose first occurrence identifies the test entity
    pub test_entity_marker_user: String,
    /// Users paired with the test entity in the scenario definition
    pub scenario_test_users: Vec<String>,
    /// Scenario pairs independent of the test entity
    pub scenario_fixed_pairs: Vec<PairKey>,
    /// Initial value of the ERROR override
    pub error_override: bool,
    /// Short entity name shown for the test entity on pair buttons
    pub test_entity_label: String,
}

impl FilterConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With initial ERROR override state
    #[inline]
    #[must_use]
    pub fn with_error_override(mut self, enabled: bool) -> Self {
        self.error_override = enabled;
        self
    }

    /// With test entity marker user
    #[inline]
    #[must_use]
    pub fn with_marker_user(mut self, user: impl Into<String>) -> Self {
        self.test_entity_marker_user = user.into();
        self
    }

    /// With users ignored by the nesting filter
    #[must_use]
    pub fn with_nest_ignored_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nest_ignored_users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the nesting filter skips this user
    #[inline]
    #[must_use]
    pub fn is_nest_ignored(&self, user: &str) -> bool {
        self.nest_ignored_users.iter().any(|u| u == user)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            nest_ignored_users: vec!["Verdict".to_string(), "Artifact".to_string()],
            test_entity_marker_user: "TAPI Jumps".to_string(),
            scenario_test_users: vec![
                "Step".to_string(),
                "Artifact".to_string(),
                "Self".to_string(),
            ],
            scenario_fixed_pairs: vec![PairKey::new("Tester", "Run")],
            error_override: true,
            test_entity_label: "[#T]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_viewer() {
        let config = FilterConfig::default();
        assert!(config.is_nest_ignored("Verdict"));
        assert!(config.is_nest_ignored("Artifact"));
        assert!(!config.is_nest_ignored("Step"));
        assert_eq!(config.test_entity_marker_user, "TAPI Jumps");
        assert!(config.error_override);
    }

    #[test]
    fn builders_override_fields() {
        let config = FilterConfig::new()
            .with_error_override(false)
            .with_marker_user("Marker")
            .with_nest_ignored_users(["Only"]);

        assert!(!config.error_override);
        assert_eq!(config.test_entity_marker_user, "Marker");
        assert!(config.is_nest_ignored("Only"));
        assert!(!config.is_nest_ignored("Verdict"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FilterConfig = serde_json::from_str(r#"{"error_override": false}"#).unwrap();
        assert!(!config.error_override);
        assert_eq!(config.test_entity_label, "[#T]");
    }
}

//! Session and configuration files

use anyhow::{Context, Result};
use logfilter_core::{FilterConfig, LogEntryIndex, RawEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rendered log tables, as exported from the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SessionFile {
    pub(crate) tables: Vec<Vec<RawEntry>>,
}

impl SessionFile {
    pub(crate) fn into_index(self) -> Result<LogEntryIndex> {
        LogEntryIndex::from_tables(self.tables).context("decoding log rows")
    }
}

pub(crate) fn load_session(path: &Path) -> Result<SessionFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading session {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing session {}", path.display()))
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<FilterConfig> {
    let Some(path) = path else {
        return Ok(FilterConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logfilter_test_utils::sample_session;
    use std::io::Write;

    #[test]
    fn session_round_trip_through_file() {
        let session = SessionFile {
            tables: sample_session().tables(),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&session).unwrap()).unwrap();

        let loaded = load_session(file.path()).unwrap();
        let index = loaded.into_index().unwrap();
        assert_eq!(index.len(), 11);
    }

    #[test]
    fn bad_row_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tables": [[{{"entity": "A", "user": "X", "level": "INFO", "nest_lvl": "?"}}]]}}"#
        )
        .unwrap();

        let err = load_session(file.path()).unwrap().into_index().unwrap_err();
        assert!(format!("{err:#}").contains("invalid nest level"));
    }

    #[test]
    fn config_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "error_override = false").unwrap();
        writeln!(file, "test_entity_marker_user = \"Marker\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!(!config.error_override);
        assert_eq!(config.test_entity_marker_user, "Marker");
        assert_eq!(config.test_entity_label, "[#T]");
    }

    #[test]
    fn missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), FilterConfig::default());
    }
}

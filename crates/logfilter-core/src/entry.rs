//! Log entry identity types
//!
//! A [`LogEntry`] carries the immutable identity of one rendered row:
//! position, entity, user, severity and nesting depth. Mutable visibility
//! lives in [`crate::visibility`], never on the entry itself.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    /// Error; subject to the ERROR override
    Error,
    /// Warning
    Warn,
    /// Informational
    Info,
    /// Verbose
    Verb,
    /// Function entry/exit trace
    EntryExit,
    /// Packet dump
    Packet,
    /// Ring buffer message
    Ring,
    /// Any other level name, kept verbatim
    Other(String),
}

impl Level {
    /// Attribute spelling of this level
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Verb => "VERB",
            Self::EntryExit => "ENTRY_EXIT",
            Self::Packet => "PACKET",
            Self::Ring => "RING",
            Self::Other(name) => name,
        }
    }

    /// Whether this is the distinguished ERROR level
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl FromStr for Level {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ERROR" => Self::Error,
            "WARN" => Self::Warn,
            "INFO" => Self::Info,
            "VERB" => Self::Verb,
            "ENTRY_EXIT" => Self::EntryExit,
            "PACKET" => Self::Packet,
            "RING" => Self::Ring,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        match Self::from_str(&s) {
            Ok(level) => level,
            Err(never) => match never {},
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Composite (entity, user) classification of an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    /// Emitting subsystem
    pub entity: String,
    /// Channel within the entity
    pub user: String,
}

impl PairKey {
    /// Create pair key
    #[inline]
    #[must_use]
    pub fn new(entity: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            user: user.into(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity, self.user)
    }
}

/// One row of the log, immutable after load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in document order, contiguous from 0
    pub sequence_index: usize,
    /// Emitting subsystem
    pub entity: String,
    /// Channel within the entity
    pub user: String,
    /// Severity
    pub level: Level,
    /// Depth in the entity's call hierarchy
    pub nest_level: u32,
}

impl LogEntry {
    /// Create entry
    #[must_use]
    pub fn new(
        sequence_index: usize,
        entity: impl Into<String>,
        user: impl Into<String>,
        level: Level,
        nest_level: u32,
    ) -> Self {
        Self {
            sequence_index,
            entity: entity.into(),
            user: user.into(),
            level,
            nest_level,
        }
    }

    /// Pair key of this entry
    #[must_use]
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.entity.clone(), self.user.clone())
    }

    /// Whether both entries come from the same entity
    #[inline]
    #[must_use]
    pub fn same_entity(&self, other: &LogEntry) -> bool {
        self.entity == other.entity
    }

    /// Whether `other` sits deeper than this entry
    #[inline]
    #[must_use]
    pub fn is_parent_of(&self, other: &LogEntry) -> bool {
        self.nest_level < other.nest_level
    }
}

/// Attribute-encoded row as read from the rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// `data-entity`
    pub entity: String,
    /// `data-user`
    pub user: String,
    /// `data-level`
    pub level: String,
    /// `data-nest-lvl`
    pub nest_lvl: String,
}

impl RawEntry {
    /// Create raw row
    #[must_use]
    pub fn new(
        entity: impl Into<String>,
        user: impl Into<String>,
        level: impl Into<String>,
        nest_lvl: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            user: user.into(),
            level: level.into(),
            nest_lvl: nest_lvl.into(),
        }
    }

    /// Decode into a [`LogEntry`] at the given document position
    ///
    /// # Errors
    /// Returns error if the entity or level is empty, or the nest level
    /// is not a non-negative integer.
    pub fn decode(self, sequence_index: usize) -> Result<LogEntry, LoadError> {
        if self.entity.is_empty() {
            return Err(LoadError::EmptyEntity {
                row: sequence_index,
            });
        }
        if self.level.is_empty() {
            return Err(LoadError::EmptyLevel {
                row: sequence_index,
            });
        }

        let nest_level = self
            .nest_lvl
            .trim()
            .parse::<u32>()
            .map_err(|_| LoadError::invalid_nest_level(sequence_index, self.nest_lvl.clone()))?;

        Ok(LogEntry {
            sequence_index,
            entity: self.entity,
            user: self.user,
            level: Level::from(self.level),
            nest_level,
        })
    }
}

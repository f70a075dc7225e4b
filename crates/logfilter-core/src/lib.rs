//! Log Filter Core
//!
//! Visibility engine for structured log entries rendered in a document.
//!
//! # Overview
//!
//! Two independent filters decide whether each entry is shown:
//! - **NestingFilter**: folds entries by call depth within one entity
//! - **EntityUserFilter**: shows/hides entries by (entity, user), with
//!   ALL / SCENARIO / TEST group toggles and an ERROR override
//!
//! [`VisibilityCombinator`] ANDs the two verdicts per entry, and
//! [`AggregateButtonStateEngine`] derives the tri-state button summaries.
//! [`FilterEngine`] owns all of it for one view and accepts
//! [`FilterCommand`]s.
//!
//! # Example
//!
//! ```rust
//! use logfilter_core::{FilterConfig, FilterEngine, LogEntryIndex, RawEntry};
//!
//! let index = LogEntryIndex::from_tables([vec![
//!     RawEntry::new("A", "X", "INFO", "0"),
//!     RawEntry::new("A", "X", "INFO", "1"),
//! ]])
//! .unwrap();
//!
//! let mut engine = FilterEngine::with_index(FilterConfig::default(), index);
//! engine.collapse(0).unwrap();
//! assert!(!engine.is_displayed(1).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod aggregate;
pub mod combinator;
pub mod command;
pub mod config;
pub mod engine;
pub mod entity_user;
pub mod entry;
pub mod error;
pub mod index;
pub mod nesting;
pub mod visibility;

// Re-exports
pub use aggregate::{AggregateButtonStateEngine, ButtonKey, ButtonStates, PairButton};
pub use combinator::VisibilityCombinator;
pub use command::{CommandOutcome, FilterCommand};
pub use config::FilterConfig;
pub use engine::{EntryView, FilterEngine, FilterEngineState, FilterObserver, ViewSnapshot};
pub use entity_user::{AggregateState, EntityUserFilter, EntityUserState, ScenarioDefinition};
pub use entry::{Level, LogEntry, PairKey, RawEntry};
pub use error::{FilterError, FilterResult, LoadError};
pub use index::LogEntryIndex;
pub use nesting::NestingFilter;
pub use visibility::{combine, EntryVisibility, FoldMark, Tristate, VisibilityTable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the filter engine
    pub use crate::{
        AggregateState, ButtonStates, CommandOutcome, FilterCommand, FilterConfig, FilterEngine,
        FilterError, FilterObserver, Level, LogEntry, LogEntryIndex, PairKey, RawEntry, Tristate,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

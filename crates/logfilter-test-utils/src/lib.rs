//! Testing utilities for the log filter workspace
//!
//! Shared fixtures, session builders and proptest strategies.

#![allow(missing_docs)]

use logfilter_core::{FilterConfig, FilterEngine, Level, LogEntry, LogEntryIndex, RawEntry};
use proptest::prelude::*;

pub const TEST_ENTITY: &str = "sockapi_test";

pub fn entry(entity: &str, user: &str, level: Level, nest_level: u32) -> LogEntry {
    LogEntry::new(0, entity, user, level, nest_level)
}

pub fn info(entity: &str, user: &str, nest_level: u32) -> LogEntry {
    entry(entity, user, Level::Info, nest_level)
}

pub fn error(entity: &str, user: &str, nest_level: u32) -> LogEntry {
    entry(entity, user, Level::Error, nest_level)
}

/// Builds multi-table sessions in raw attribute form
#[derive(Debug)]
pub struct SessionBuilder {
    tables: Vec<Vec<RawEntry>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            tables: vec![Vec::new()],
        }
    }

    pub fn row(mut self, entity: &str, user: &str, level: &str, nest_level: u32) -> Self {
        if let Some(table) = self.tables.last_mut() {
            table.push(RawEntry::new(entity, user, level, nest_level.to_string()));
        }
        self
    }

    pub fn info(self, entity: &str, user: &str, nest_level: u32) -> Self {
        self.row(entity, user, "INFO", nest_level)
    }

    pub fn error(self, entity: &str, user: &str, nest_level: u32) -> Self {
        self.row(entity, user, "ERROR", nest_level)
    }

    /// Start the next table
    pub fn table(mut self) -> Self {
        self.tables.push(Vec::new());
        self
    }

    pub fn tables(self) -> Vec<Vec<RawEntry>> {
        self.tables
    }

    pub fn build(self) -> LogEntryIndex {
        LogEntryIndex::from_tables(self.tables).unwrap()
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Three entries: A/X INFO 0, A/X INFO 1, A/X ERROR 1
pub fn end_to_end_index() -> LogEntryIndex {
    LogEntryIndex::from_entries([info("A", "X", 0), info("A", "X", 1), error("A", "X", 1)])
}

/// Pre-test table, a test run with a helper entity interleaved, post-test table
///
/// ```text
///  0 Tester        Run         INFO 0
///  1 sockapi_test  TAPI Jumps  INFO 0
///  2 sockapi_test  Step        INFO 0
///  3 sockapi_test  Self        INFO 1
///  4 Engine        Self        INFO 0
///  5 sockapi_test  Self        INFO 2
///  6 sockapi_test  Artifact    INFO 0
///  7 sockapi_test  Self        ERROR 2
///  8 sockapi_test  Step        INFO 0
///  9 sockapi_test  Verdict     INFO 0
/// 10 Tester        Run         INFO 0   (post-test table)
/// ```
pub fn sample_session() -> SessionBuilder {
    SessionBuilder::new()
        .info("Tester", "Run", 0)
        .table()
        .info(TEST_ENTITY, "TAPI Jumps", 0)
        .info(TEST_ENTITY, "Step", 0)
        .info(TEST_ENTITY, "Self", 1)
        .info("Engine", "Self", 0)
        .info(TEST_ENTITY, "Self", 2)
        .info(TEST_ENTITY, "Artifact", 0)
        .error(TEST_ENTITY, "Self", 2)
        .info(TEST_ENTITY, "Step", 0)
        .info(TEST_ENTITY, "Verdict", 0)
        .table()
        .info("Tester", "Run", 0)
}

/// Session with no "TAPI Jumps" row
pub fn session_without_test_entity() -> SessionBuilder {
    SessionBuilder::new()
        .info("Tester", "Run", 0)
        .info("Engine", "Self", 0)
        .info("Engine", "Self", 1)
}

pub fn engine_for(index: LogEntryIndex) -> FilterEngine {
    FilterEngine::with_index(FilterConfig::default(), index)
}

pub fn engine_without_override(index: LogEntryIndex) -> FilterEngine {
    FilterEngine::with_index(FilterConfig::default().with_error_override(false), index)
}

/// Arbitrary entries over a small alphabet so pairs and nesting collide often
pub fn arb_entry() -> impl Strategy<Value = LogEntry> {
    (
        prop::sample::select(vec!["A", "B", TEST_ENTITY]),
        prop::sample::select(vec!["X", "Y", "Step", "Self", "Artifact", "Verdict", "TAPI Jumps"]),
        prop::bool::weighted(0.2),
        0u32..4,
    )
        .prop_map(|(entity, user, is_error, nest_level)| {
            let level = if is_error { Level::Error } else { Level::Info };
            entry(entity, user, level, nest_level)
        })
}

pub fn arb_index(max_len: usize) -> impl Strategy<Value = LogEntryIndex> {
    prop::collection::vec(arb_entry(), 0..max_len).prop_map(LogEntryIndex::from_entries)
}

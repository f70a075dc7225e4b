//! Nesting filter
//!
//! Folds entries by call depth within one entity. The nested run of an
//! entry is the stretch of deeper same-entity entries that follow it, up to
//! the next same-entity entry at its own depth or shallower. Entries from
//! other entities, and entries whose user is ignored, are skipped without
//! ending the run.

use crate::config::FilterConfig;
use crate::entry::LogEntry;
use crate::error::FilterResult;
use crate::index::LogEntryIndex;
use crate::visibility::{FoldMark, Tristate, VisibilityTable};

/// Nesting-dimension filter
#[derive(Debug, Clone)]
pub struct NestingFilter {
    /// Users never subject to folds
    ignored_users: Vec<String>,

    /// Depth passed to the last `reset_all`; `None` means everything expanded
    active_depth: Option<u32>,
}

impl NestingFilter {
    /// Create filter from configuration
    #[must_use]
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            ignored_users: config.nest_ignored_users.clone(),
            active_depth: None,
        }
    }

    fn is_ignored(&self, user: &str) -> bool {
        self.ignored_users.iter().any(|u| u == user)
    }

    /// Entries nested beneath entry `i`, in sequence order
    ///
    /// # Errors
    /// Returns [`FilterError::EntryOutOfRange`](crate::FilterError::EntryOutOfRange)
    /// if `i` is past the end.
    pub fn nested_run(&self, index: &LogEntryIndex, i: usize) -> FilterResult<Vec<usize>> {
        let parent = index.entry(i)?;
        Ok(self.run_from(index, parent))
    }

    fn run_from(&self, index: &LogEntryIndex, parent: &LogEntry) -> Vec<usize> {
        let mut run = Vec::new();
        for candidate in index.iter().skip(parent.sequence_index + 1) {
            if self.is_ignored(&candidate.user) || !parent.same_entity(candidate) {
                continue;
            }
            if !parent.is_parent_of(candidate) {
                break;
            }
            run.push(candidate.sequence_index);
        }
        run
    }

    /// Hide the nested run of entry `i`
    ///
    /// Returns the rows whose display state changed.
    ///
    /// # Errors
    /// Returns error if `i` is out of range.
    pub fn collapse(
        &self,
        index: &LogEntryIndex,
        table: &mut VisibilityTable,
        i: usize,
    ) -> FilterResult<Vec<usize>> {
        let run = self.nested_run(index, i)?;
        let changed = Self::set_run(table, &run, Tristate::No);
        if !run.is_empty() {
            table.set_fold(i, FoldMark::Expandable);
        }
        tracing::debug!(entry = i, nested = run.len(), "collapsed");
        Ok(changed)
    }

    /// Show the nested run of entry `i`
    ///
    /// Returns the rows whose display state changed.
    ///
    /// # Errors
    /// Returns error if `i` is out of range.
    pub fn expand(
        &self,
        index: &LogEntryIndex,
        table: &mut VisibilityTable,
        i: usize,
    ) -> FilterResult<Vec<usize>> {
        let run = self.nested_run(index, i)?;
        let changed = Self::set_run(table, &run, Tristate::Yes);
        table.set_fold(i, FoldMark::Collapsible);
        tracing::debug!(entry = i, nested = run.len(), "expanded");
        Ok(changed)
    }

    /// Show every entry, then auto-collapse entries sitting at `depth`
    ///
    /// `None` expands everything. Returns the rows whose display state
    /// differs from before the reset, in sequence order.
    pub fn reset_all(
        &mut self,
        index: &LogEntryIndex,
        table: &mut VisibilityTable,
        depth: Option<u32>,
    ) -> Vec<usize> {
        self.active_depth = depth;
        let before: Vec<bool> = table.rows().iter().map(|r| r.displayed).collect();

        for row in 0..index.len() {
            table.set_nest(row, Tristate::Yes);
        }

        for entry in index {
            let row = entry.sequence_index;
            let run = self.run_from(index, entry);
            if run.is_empty() {
                table.set_fold(row, FoldMark::None);
                continue;
            }

            table.set_fold(row, FoldMark::Collapsible);
            if depth == Some(entry.nest_level) {
                Self::set_run(table, &run, Tristate::No);
                table.set_fold(row, FoldMark::Expandable);
            }
        }

        let changed: Vec<usize> = before
            .iter()
            .zip(table.rows())
            .enumerate()
            .filter(|(_, (was, now))| **was != now.displayed)
            .map(|(row, _)| row)
            .collect();
        tracing::debug!(?depth, changed = changed.len(), "nesting reset");
        changed
    }

    /// Depth applied by the last reset
    #[inline]
    #[must_use]
    pub fn active_depth(&self) -> Option<u32> {
        self.active_depth
    }

    /// On/off state of the depth buttons `0..=max_nest_level`
    ///
    /// A level is "on" when it is at or above the active depth, or when
    /// everything is expanded.
    #[must_use]
    pub fn depth_buttons(&self, index: &LogEntryIndex) -> Vec<bool> {
        let Some(max) = index.max_nest_level() else {
            return Vec::new();
        };
        (0..=max)
            .map(|level| self.active_depth.map_or(true, |depth| level <= depth))
            .collect()
    }

    fn set_run(table: &mut VisibilityTable, run: &[usize], verdict: Tristate) -> Vec<usize> {
        run.iter()
            .copied()
            .filter(|&row| table.set_nest(row, verdict))
            .collect()
    }
}

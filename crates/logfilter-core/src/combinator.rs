//! Merges the entity/user dimension into per-entry visibility
//!
//! The nesting filter writes its own verdicts directly. Entity/user changes
//! arrive as pair batches and are pushed to the rows carrying those pairs.

use crate::entity_user::EntityUserFilter;
use crate::entry::PairKey;
use crate::index::LogEntryIndex;
use crate::visibility::VisibilityTable;

/// Applies entity/user verdicts to the visibility table
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityCombinator;

impl VisibilityCombinator {
    /// Recompute rows whose pair is in `changed`
    ///
    /// Returns the rows whose display state flipped, in sequence order.
    pub fn apply_pairs(
        index: &LogEntryIndex,
        filter: &EntityUserFilter,
        table: &mut VisibilityTable,
        changed: &[PairKey],
    ) -> Vec<usize> {
        let mut flipped = Vec::new();
        for pair in changed {
            for &row in index.rows_for_pair(pair) {
                if let Some(entry) = index.get(row) {
                    if table.set_eu(row, filter.verdict(entry)) {
                        flipped.push(row);
                    }
                }
            }
        }
        flipped.sort_unstable();
        flipped
    }

    /// Recompute every row against the full state
    pub fn apply_all(
        index: &LogEntryIndex,
        filter: &EntityUserFilter,
        table: &mut VisibilityTable,
    ) -> Vec<usize> {
        index
            .iter()
            .filter(|entry| table.set_eu(entry.sequence_index, filter.verdict(entry)))
            .map(|entry| entry.sequence_index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::entry::{Level, LogEntry};
    use crate::visibility::Tristate;

    fn setup() -> (LogEntryIndex, EntityUserFilter, VisibilityTable) {
        let index = LogEntryIndex::from_entries([
            LogEntry::new(0, "A", "X", Level::Info, 0),
            LogEntry::new(0, "B", "Y", Level::Info, 0),
            LogEntry::new(0, "A", "X", Level::Error, 0),
        ]);
        let filter = EntityUserFilter::new(&index, &FilterConfig::default().with_error_override(false));
        let table = VisibilityTable::new(index.len());
        (index, filter, table)
    }

    #[test]
    fn apply_pairs_touches_only_changed_rows() {
        let (index, mut filter, mut table) = setup();
        let changed = filter.toggle("A", "X");

        let flipped = VisibilityCombinator::apply_pairs(&index, &filter, &mut table, &changed);

        assert_eq!(flipped, vec![0, 2]);
        assert_eq!(table.get(1).unwrap().eu, Tristate::Unset);
        assert_eq!(table.get(0).unwrap().eu, Tristate::No);
    }

    #[test]
    fn apply_all_picks_up_override() {
        let (index, mut filter, mut table) = setup();
        let changed = filter.toggle("A", "X");
        VisibilityCombinator::apply_pairs(&index, &filter, &mut table, &changed);

        filter.toggle_error_override();
        let flipped = VisibilityCombinator::apply_all(&index, &filter, &mut table);

        assert_eq!(flipped, vec![2]);
        assert!(table.get(2).unwrap().displayed);
        assert!(!table.get(0).unwrap().displayed);
        assert_eq!(table.get(1).unwrap().eu, Tristate::Yes);
    }
}

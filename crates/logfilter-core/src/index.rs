//! Ordered log entry index
//!
//! Provides [`LogEntryIndex`], the read-only substrate every filter queries.
//! Built once from one or more rendered tables, concatenated in table order.

use crate::entry::{LogEntry, PairKey, RawEntry};
use crate::error::{FilterError, FilterResult, LoadError};
use indexmap::IndexMap;

/// Immutable, document-ordered sequence of log entries
///
/// Besides positional access the index keeps a reverse map from
/// (entity, user) to the rows carrying that pair, so batch visibility
/// updates only touch affected rows.
#[derive(Debug, Clone, Default)]
pub struct LogEntryIndex {
    /// Entries; `entries[i].sequence_index == i`
    entries: Vec<LogEntry>,

    /// Reverse index: pair -> rows, pairs in first-seen order
    by_pair: IndexMap<PairKey, Vec<usize>>,
}

impl LogEntryIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded entries, renumbering them in the given order
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        let mut index = Self::new();
        for mut entry in entries {
            entry.sequence_index = index.entries.len();
            index.push(entry);
        }
        index
    }

    /// Build from attribute-encoded tables, preserving table order then row order
    ///
    /// # Errors
    /// Returns the first row that fails to decode.
    pub fn from_tables<T>(tables: impl IntoIterator<Item = T>) -> Result<Self, LoadError>
    where
        T: IntoIterator<Item = RawEntry>,
    {
        let mut index = Self::new();
        for table in tables {
            for raw in table {
                let entry = raw.decode(index.entries.len())?;
                index.push(entry);
            }
        }
        Ok(index)
    }

    fn push(&mut self, entry: LogEntry) {
        self.by_pair
            .entry(entry.pair())
            .or_default()
            .push(entry.sequence_index);
        self.entries.push(entry);
    }

    /// Total entry count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at position, if any
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    /// Entry at position
    ///
    /// # Errors
    /// Returns [`FilterError::EntryOutOfRange`] past the end.
    pub fn entry(&self, index: usize) -> FilterResult<&LogEntry> {
        self.entries
            .get(index)
            .ok_or_else(|| FilterError::out_of_range(index, self.entries.len()))
    }

    /// All entries in document order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Distinct (entity, user) pairs in first-seen order
    pub fn pairs(&self) -> impl Iterator<Item = &PairKey> {
        self.by_pair.keys()
    }

    /// Rows carrying the given pair
    #[must_use]
    pub fn rows_for_pair(&self, pair: &PairKey) -> &[usize] {
        self.by_pair.get(pair).map_or(&[][..], Vec::as_slice)
    }

    /// Entity of the first entry whose user equals `marker_user`
    #[must_use]
    pub fn detect_test_entity(&self, marker_user: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.user == marker_user)
            .map(|e| e.entity.as_str())
    }

    /// Deepest nest level present
    #[must_use]
    pub fn max_nest_level(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.nest_level).max()
    }
}

impl<'a> IntoIterator for &'a LogEntryIndex {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Level;

    fn raw(entity: &str, user: &str, lvl: &str) -> RawEntry {
        RawEntry::new(entity, user, "INFO", lvl)
    }

    #[test]
    fn tables_concatenate_in_order() {
        let pre = vec![raw("A", "X", "0"), raw("A", "X", "1")];
        let post = vec![raw("B", "Y", "0")];

        let index = LogEntryIndex::from_tables([pre, post]).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.get(2).unwrap().entity, "B");
        assert!(index.iter().enumerate().all(|(i, e)| e.sequence_index == i));
    }

    #[test]
    fn bad_row_reports_global_position() {
        let pre = vec![raw("A", "X", "0")];
        let post = vec![raw("B", "Y", "zz")];

        let err = LogEntryIndex::from_tables([pre, post]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidNestLevel { row: 1, .. }));
    }

    #[test]
    fn from_entries_renumbers() {
        let index = LogEntryIndex::from_entries([
            LogEntry::new(9, "A", "X", Level::Info, 0),
            LogEntry::new(9, "A", "X", Level::Info, 1),
        ]);
        assert_eq!(index.get(1).unwrap().sequence_index, 1);
    }

    #[test]
    fn entry_out_of_range() {
        let index = LogEntryIndex::new();
        assert_eq!(index.entry(0).unwrap_err(), FilterError::out_of_range(0, 0));
    }

    #[test]
    fn pairs_and_rows() {
        let index = LogEntryIndex::from_tables([vec![
            raw("A", "X", "0"),
            raw("B", "Y", "0"),
            raw("A", "X", "1"),
        ]])
        .unwrap();

        let pairs: Vec<_> = index.pairs().cloned().collect();
        assert_eq!(pairs, vec![PairKey::new("A", "X"), PairKey::new("B", "Y")]);
        assert_eq!(index.rows_for_pair(&PairKey::new("A", "X")), &[0, 2]);
        assert!(index.rows_for_pair(&PairKey::new("C", "Z")).is_empty());
    }

    #[test]
    fn detects_first_marker_entity() {
        let index = LogEntryIndex::from_tables([vec![
            raw("Tester", "Run", "0"),
            raw("my_test", "TAPI Jumps", "0"),
            raw("other", "TAPI Jumps", "0"),
        ]])
        .unwrap();

        assert_eq!(index.detect_test_entity("TAPI Jumps"), Some("my_test"));
        assert_eq!(index.detect_test_entity("Nope"), None);
    }

    #[test]
    fn max_nest_level() {
        let index = LogEntryIndex::from_tables([vec![raw("A", "X", "0"), raw("A", "X", "4")]]).unwrap();
        assert_eq!(index.max_nest_level(), Some(4));
        assert_eq!(LogEntryIndex::new().max_nest_level(), None);
    }
}

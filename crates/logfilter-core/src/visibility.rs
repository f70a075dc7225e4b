//! Per-entry visibility state and the two-dimension combinator
//!
//! Each entry carries one [`Tristate`] per filter dimension. The effective
//! display decision is the AND of both; [`Tristate::Unset`] never hides.

use serde::{Deserialize, Serialize};

/// One dimension's verdict on an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tristate {
    /// Dimension has no opinion
    #[default]
    Unset,
    /// Dimension shows the entry
    Yes,
    /// Dimension hides the entry
    No,
}

impl Tristate {
    /// Map a boolean verdict
    #[inline]
    #[must_use]
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// Whether this verdict lets the entry through
    #[inline]
    #[must_use]
    pub fn permits(self) -> bool {
        !matches!(self, Self::No)
    }
}

/// Toggle affordance recorded for an entry by the nesting filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldMark {
    /// Entry has nothing nested under it (or was never examined)
    #[default]
    None,
    /// Nested run is hidden; clicking expands
    Expandable,
    /// Nested run is shown; clicking collapses
    Collapsible,
}

/// Mutable visibility attributes of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryVisibility {
    /// Nesting dimension verdict
    pub nest: Tristate,
    /// Entity/user dimension verdict
    pub eu: Tristate,
    /// Effective display state, kept in sync by [`VisibilityTable`]
    pub displayed: bool,
    /// Fold affordance
    pub fold: FoldMark,
}

impl EntryVisibility {
    /// Fresh state: both dimensions unset, displayed
    #[must_use]
    pub fn new() -> Self {
        Self {
            displayed: true,
            ..Self::default()
        }
    }
}

/// Effective display decision for a pair of verdicts
#[inline]
#[must_use]
pub fn combine(nest: Tristate, eu: Tristate) -> bool {
    nest.permits() && eu.permits()
}

/// Visibility state for every entry, indexed by sequence position
#[derive(Debug, Clone, Default)]
pub struct VisibilityTable {
    rows: Vec<EntryVisibility>,
}

impl VisibilityTable {
    /// Table of `len` fresh rows
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            rows: vec![EntryVisibility::new(); len],
        }
    }

    /// Row count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// State of one row
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EntryVisibility> {
        self.rows.get(index)
    }

    /// All rows in sequence order
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[EntryVisibility] {
        &self.rows
    }

    /// Set the nesting verdict and recompute display
    ///
    /// Returns `true` if the display state changed.
    pub fn set_nest(&mut self, index: usize, verdict: Tristate) -> bool {
        let row = &mut self.rows[index];
        row.nest = verdict;
        Self::refresh(row)
    }

    /// Set the entity/user verdict and recompute display
    ///
    /// Returns `true` if the display state changed.
    pub fn set_eu(&mut self, index: usize, verdict: Tristate) -> bool {
        let row = &mut self.rows[index];
        row.eu = verdict;
        Self::refresh(row)
    }

    /// Record the fold affordance
    #[inline]
    pub fn set_fold(&mut self, index: usize, mark: FoldMark) {
        self.rows[index].fold = mark;
    }

    fn refresh(row: &mut EntryVisibility) -> bool {
        let displayed = combine(row.nest, row.eu);
        let changed = displayed != row.displayed;
        row.displayed = displayed;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Tristate; 3] = [Tristate::Unset, Tristate::Yes, Tristate::No];

    #[test]
    fn combine_is_and_with_unset_permissive() {
        for nest in ALL {
            for eu in ALL {
                let expected = nest != Tristate::No && eu != Tristate::No;
                assert_eq!(combine(nest, eu), expected, "{nest:?} x {eu:?}");
            }
        }
    }

    #[test]
    fn table_tracks_display_changes() {
        let mut table = VisibilityTable::new(2);
        assert!(table.get(0).unwrap().displayed);

        assert!(table.set_nest(0, Tristate::No));
        assert!(!table.get(0).unwrap().displayed);

        // Hidden by nesting, E/U change does not reveal it
        assert!(!table.set_eu(0, Tristate::Yes));
        assert!(!table.get(0).unwrap().displayed);

        assert!(table.set_nest(0, Tristate::Yes));
        assert!(table.get(0).unwrap().displayed);
        assert_eq!(table.get(1).unwrap().nest, Tristate::Unset);
    }

    #[test]
    fn tristate_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Tristate::Unset).unwrap(), "\"unset\"");
        assert_eq!(serde_json::to_string(&FoldMark::Expandable).unwrap(), "\"expandable\"");
    }
}

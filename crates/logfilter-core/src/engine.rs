//! Filter engine
//!
//! [`FilterEngine`] owns all filter state for one view and is the only
//! writer of it. Every command runs to completion: entry visibility is
//! fully updated and entry observers notified before button states are
//! recomputed and button observers notified.

use crate::aggregate::{AggregateButtonStateEngine, ButtonKey, ButtonStates};
use crate::combinator::VisibilityCombinator;
use crate::command::{CommandOutcome, FilterCommand};
use crate::config::FilterConfig;
use crate::entity_user::EntityUserFilter;
use crate::entry::{Level, PairKey, RawEntry};
use crate::error::{FilterError, FilterResult};
use crate::index::LogEntryIndex;
use crate::nesting::NestingFilter;
use crate::visibility::{EntryVisibility, FoldMark, Tristate, VisibilityTable};
use serde::Serialize;
use std::fmt;

/// Receives change notifications from the engine
///
/// Entry notifications for a command always precede its button
/// notification.
pub trait FilterObserver {
    /// Rows whose display state flipped
    fn on_entries_changed(&mut self, rows: &[usize], table: &VisibilityTable) {
        let _ = (rows, table);
    }

    /// Buttons whose state changed, with the full new snapshot
    fn on_buttons_changed(&mut self, keys: &[ButtonKey], states: &ButtonStates) {
        let _ = (keys, states);
    }
}

/// All mutable and immutable state of one initialized view
#[derive(Debug, Clone)]
pub struct FilterEngineState {
    index: LogEntryIndex,
    table: VisibilityTable,
    nesting: NestingFilter,
    entity_user: EntityUserFilter,
    buttons: ButtonStates,
}

impl FilterEngineState {
    fn build(index: LogEntryIndex, config: &FilterConfig, aggregates: &AggregateButtonStateEngine) -> Self {
        let mut table = VisibilityTable::new(index.len());
        let mut nesting = NestingFilter::new(config);
        let entity_user = EntityUserFilter::new(&index, config);

        VisibilityCombinator::apply_all(&index, &entity_user, &mut table);
        nesting.reset_all(&index, &mut table, None);
        let buttons = aggregates.recompute(&entity_user);

        Self {
            index,
            table,
            nesting,
            entity_user,
            buttons,
        }
    }

    /// Loaded entries
    #[inline]
    #[must_use]
    pub fn index(&self) -> &LogEntryIndex {
        &self.index
    }

    /// Per-entry visibility
    #[inline]
    #[must_use]
    pub fn table(&self) -> &VisibilityTable {
        &self.table
    }

    /// Entity/user filter
    #[inline]
    #[must_use]
    pub fn entity_user(&self) -> &EntityUserFilter {
        &self.entity_user
    }

    /// Nesting filter
    #[inline]
    #[must_use]
    pub fn nesting(&self) -> &NestingFilter {
        &self.nesting
    }

    /// Current button states
    #[inline]
    #[must_use]
    pub fn buttons(&self) -> &ButtonStates {
        &self.buttons
    }
}

/// Visibility engine for one rendered log view
pub struct FilterEngine {
    config: FilterConfig,
    aggregates: AggregateButtonStateEngine,
    state: Option<FilterEngineState>,
    observers: Vec<Box<dyn FilterObserver>>,
}

impl FilterEngine {
    /// Create uninitialized engine
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self {
            aggregates: AggregateButtonStateEngine::new(&config),
            config,
            state: None,
            observers: Vec::new(),
        }
    }

    /// Create and initialize in one step
    #[must_use]
    pub fn with_index(config: FilterConfig, index: LogEntryIndex) -> Self {
        let mut engine = Self::new(config);
        engine.init(index);
        engine
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: Box<dyn FilterObserver>) {
        self.observers.push(observer);
    }

    /// Load entries and build fresh state
    ///
    /// Every entry starts visible in both dimensions with fold marks set.
    pub fn init(&mut self, index: LogEntryIndex) {
        let state = FilterEngineState::build(index, &self.config, &self.aggregates);
        tracing::info!(
            entries = state.index.len(),
            pairs = state.entity_user.state().len(),
            test_entity = state.entity_user.test_entity().unwrap_or("<none>"),
            "filter engine initialized"
        );
        self.state = Some(state);
    }

    /// Decode attribute-encoded tables and initialize
    ///
    /// # Errors
    /// Returns [`FilterError::Load`] if a row fails to decode.
    pub fn init_from_tables<T>(&mut self, tables: impl IntoIterator<Item = T>) -> FilterResult<()>
    where
        T: IntoIterator<Item = RawEntry>,
    {
        let index = LogEntryIndex::from_tables(tables)?;
        self.init(index);
        Ok(())
    }

    /// Whether `init` has run
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Initialized state
    ///
    /// # Errors
    /// Returns [`FilterError::NotInitialized`] before `init`.
    pub fn state(&self) -> FilterResult<&FilterEngineState> {
        self.state.as_ref().ok_or(FilterError::NotInitialized)
    }

    fn state_mut(&mut self) -> FilterResult<&mut FilterEngineState> {
        self.state.as_mut().ok_or(FilterError::NotInitialized)
    }

    /// Restore the post-`init` state over the same entries
    ///
    /// # Errors
    /// Returns [`FilterError::NotInitialized`] before `init`.
    pub fn reset(&mut self) -> FilterResult<CommandOutcome> {
        let old = self.state.take().ok_or(FilterError::NotInitialized)?;
        let before: Vec<bool> = old.table.rows().iter().map(|r| r.displayed).collect();
        let old_buttons = old.buttons;

        let state = FilterEngineState::build(old.index, &self.config, &self.aggregates);
        let changed_rows = state
            .table
            .rows()
            .iter()
            .zip(before)
            .enumerate()
            .filter(|(_, (row, was))| row.displayed != *was)
            .map(|(i, _)| i)
            .collect();
        let changed_buttons = old_buttons.diff(&state.buttons);
        let buttons = state.buttons.clone();
        self.state = Some(state);
        tracing::info!("filter engine reset");

        let outcome = CommandOutcome {
            changed_rows,
            changed_pairs: Vec::new(),
            changed_buttons,
            buttons: Some(buttons),
        };
        self.notify(&outcome)?;
        Ok(outcome)
    }

    /// Run one command to completion
    ///
    /// # Errors
    /// Returns [`FilterError::NotInitialized`] before `init`, or
    /// [`FilterError::EntryOutOfRange`] for a bad collapse/expand target.
    pub fn dispatch(&mut self, command: FilterCommand) -> FilterResult<CommandOutcome> {
        tracing::debug!(?command, "dispatch");
        let aggregates = &self.aggregates;
        let state = self.state.as_mut().ok_or(FilterError::NotInitialized)?;

        let touches_buttons = command.is_entity_user();
        let override_toggled = command == FilterCommand::ToggleErrorOverride;
        let mut outcome = CommandOutcome::default();
        match command {
            FilterCommand::Collapse { entry } => {
                outcome.changed_rows = state.nesting.collapse(&state.index, &mut state.table, entry)?;
            }
            FilterCommand::Expand { entry } => {
                outcome.changed_rows = state.nesting.expand(&state.index, &mut state.table, entry)?;
            }
            FilterCommand::ResetAll { depth } => {
                outcome.changed_rows = state.nesting.reset_all(&state.index, &mut state.table, depth);
            }
            FilterCommand::Toggle { entity, user } => {
                outcome.changed_pairs = state.entity_user.toggle(&entity, &user);
            }
            FilterCommand::ToggleAll => {
                outcome.changed_pairs = state.entity_user.toggle_all();
            }
            FilterCommand::ToggleScenario => {
                outcome.changed_pairs = state.entity_user.toggle_scenario();
            }
            FilterCommand::ToggleTest => {
                outcome.changed_pairs = state.entity_user.toggle_test();
            }
            FilterCommand::ToggleErrorOverride => {
                let enabled = state.entity_user.toggle_error_override();
                tracing::debug!(enabled, "error override toggled");
                outcome.changed_rows =
                    VisibilityCombinator::apply_all(&state.index, &state.entity_user, &mut state.table);
            }
        }

        if !outcome.changed_pairs.is_empty() {
            tracing::debug!(pairs = outcome.changed_pairs.len(), "applying pair batch");
            outcome.changed_rows = VisibilityCombinator::apply_pairs(
                &state.index,
                &state.entity_user,
                &mut state.table,
                &outcome.changed_pairs,
            );
        }

        if touches_buttons && (override_toggled || !outcome.changed_pairs.is_empty()) {
            let next = aggregates.recompute(&state.entity_user);
            outcome.changed_buttons = state.buttons.diff(&next);
            state.buttons = next;
            outcome.buttons = Some(state.buttons.clone());
        }

        self.notify(&outcome)?;
        Ok(outcome)
    }

    fn notify(&mut self, outcome: &CommandOutcome) -> FilterResult<()> {
        if self.observers.is_empty() {
            return Ok(());
        }
        let state = self.state.as_ref().ok_or(FilterError::NotInitialized)?;

        if !outcome.changed_rows.is_empty() {
            for observer in &mut self.observers {
                observer.on_entries_changed(&outcome.changed_rows, &state.table);
            }
        }
        if !outcome.changed_buttons.is_empty() {
            for observer in &mut self.observers {
                observer.on_buttons_changed(&outcome.changed_buttons, &state.buttons);
            }
        }
        Ok(())
    }

    /// Hide the nested run of entry `i`
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn collapse(&mut self, i: usize) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::Collapse { entry: i })
    }

    /// Show the nested run of entry `i`
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn expand(&mut self, i: usize) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::Expand { entry: i })
    }

    /// Expand all, then fold at `depth` (`None`: expand all)
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn reset_all(&mut self, depth: Option<u32>) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::ResetAll { depth })
    }

    /// Flip one pair
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn toggle(&mut self, entity: &str, user: &str) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::toggle(entity, user))
    }

    /// `#ALL` button
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn toggle_all(&mut self) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::ToggleAll)
    }

    /// `#SCENARIO` button
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn toggle_scenario(&mut self) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::ToggleScenario)
    }

    /// `#TEST` button
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn toggle_test(&mut self) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::ToggleTest)
    }

    /// `ERROR` button
    ///
    /// # Errors
    /// See [`FilterEngine::dispatch`].
    pub fn toggle_error_override(&mut self) -> FilterResult<CommandOutcome> {
        self.dispatch(FilterCommand::ToggleErrorOverride)
    }

    /// Visibility attributes of entry `i`
    ///
    /// # Errors
    /// Returns error before `init` or if `i` is out of range.
    pub fn visibility(&self, i: usize) -> FilterResult<EntryVisibility> {
        let state = self.state()?;
        state
            .table
            .get(i)
            .copied()
            .ok_or_else(|| FilterError::out_of_range(i, state.table.len()))
    }

    /// Effective display state of entry `i`
    ///
    /// # Errors
    /// Returns error before `init` or if `i` is out of range.
    pub fn is_displayed(&self, i: usize) -> FilterResult<bool> {
        self.visibility(i).map(|v| v.displayed)
    }

    /// Entries nested beneath entry `i`
    ///
    /// # Errors
    /// Returns error before `init` or if `i` is out of range.
    pub fn nested_run(&self, i: usize) -> FilterResult<Vec<usize>> {
        let state = self.state()?;
        state.nesting.nested_run(&state.index, i)
    }

    /// Current button states
    ///
    /// # Errors
    /// Returns [`FilterError::NotInitialized`] before `init`.
    pub fn buttons(&self) -> FilterResult<&ButtonStates> {
        self.state().map(FilterEngineState::buttons)
    }

    /// On/off state of nest-depth buttons
    ///
    /// # Errors
    /// Returns [`FilterError::NotInitialized`] before `init`.
    pub fn depth_buttons(&self) -> FilterResult<Vec<bool>> {
        let state = self.state()?;
        Ok(state.nesting.depth_buttons(&state.index))
    }

    /// Serializable view of every entry and button
    ///
    /// # Errors
    /// Returns [`FilterError::NotInitialized`] before `init`.
    pub fn snapshot(&self) -> FilterResult<ViewSnapshot> {
        let state = self.state()?;
        let entries = state
            .index
            .iter()
            .zip(state.table.rows())
            .map(|(entry, vis)| EntryView {
                index: entry.sequence_index,
                pair: entry.pair(),
                level: entry.level.clone(),
                nest_level: entry.nest_level,
                nest: vis.nest,
                eu: vis.eu,
                displayed: vis.displayed,
                fold: vis.fold,
            })
            .collect();

        Ok(ViewSnapshot {
            entries,
            buttons: state.buttons.clone(),
            depth_buttons: state.nesting.depth_buttons(&state.index),
            active_depth: state.nesting.active_depth(),
            test_entity: state.entity_user.test_entity().map(str::to_string),
        })
    }
}

impl fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// One entry as seen by the rendering side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    /// Sequence position
    pub index: usize,
    /// Entity and user
    #[serde(flatten)]
    pub pair: PairKey,
    /// Severity
    pub level: Level,
    /// Nest level
    pub nest_level: u32,
    /// Nesting verdict
    pub nest: Tristate,
    /// Entity/user verdict
    pub eu: Tristate,
    /// Effective display state
    pub displayed: bool,
    /// Fold affordance
    pub fold: FoldMark,
}

/// Full view state for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    /// Every entry in sequence order
    pub entries: Vec<EntryView>,
    /// Entity/user buttons
    pub buttons: ButtonStates,
    /// Nest-depth buttons
    pub depth_buttons: Vec<bool>,
    /// Depth of the last reset
    pub active_depth: Option<u32>,
    /// Detected test entity
    pub test_entity: Option<String>,
}

impl ViewSnapshot {
    /// Indices of displayed entries
    #[must_use]
    pub fn displayed(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.displayed)
            .map(|e| e.index)
            .collect()
    }
}

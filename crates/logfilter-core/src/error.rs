//! Error types for the log filter engine
//!
//! The engine performs no I/O. Errors cover:
//! - Load operations (attribute-encoded rows → [`LogEntry`](crate::LogEntry))
//! - Caller contract violations (out-of-range entry, engine not initialized)
//!
//! Outcomes that are legitimate at runtime (toggling an unknown pair,
//! clicking a disabled aggregate, no test entity) are reported through
//! outcome values, not errors.

/// Errors while decoding attribute-encoded log rows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Nest level attribute is not a non-negative integer
    #[error("row {row}: invalid nest level '{value}'")]
    InvalidNestLevel { row: usize, value: String },

    /// Entity attribute missing or empty
    #[error("row {row}: entity attribute is empty")]
    EmptyEntity { row: usize },

    /// Level attribute missing or empty
    #[error("row {row}: level attribute is empty")]
    EmptyLevel { row: usize },
}

impl LoadError {
    /// Create invalid nest level error
    pub fn invalid_nest_level(row: usize, value: impl Into<String>) -> Self {
        Self::InvalidNestLevel {
            row,
            value: value.into(),
        }
    }
}

/// Errors raised by filter operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Entry index outside the loaded sequence
    #[error("entry index {index} out of range (len {len})")]
    EntryOutOfRange { index: usize, len: usize },

    /// Operation requires a prior `init()`
    #[error("filter engine is not initialized")]
    NotInitialized,

    /// Input rows could not be decoded
    #[error("load error: {0}")]
    Load(#[from] LoadError),
}

impl FilterError {
    /// Create out-of-range error
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::EntryOutOfRange { index, len }
    }
}

/// Result type alias for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display() {
        let err = FilterError::out_of_range(7, 3);
        assert_eq!(err.to_string(), "entry index 7 out of range (len 3)");
    }

    #[test]
    fn load_error_display() {
        let err = LoadError::invalid_nest_level(2, "x1");
        assert_eq!(err.to_string(), "row 2: invalid nest level 'x1'");
    }

    #[test]
    fn error_conversions() {
        let load = LoadError::EmptyEntity { row: 0 };
        let err: FilterError = load.into();
        assert!(matches!(err, FilterError::Load(LoadError::EmptyEntity { row: 0 })));
    }
}

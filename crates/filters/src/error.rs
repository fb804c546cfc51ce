use thiserror::Error;

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors raised while loading or editing filters.
///
/// Compilation never fails: filters that cannot contribute to a query are skipped.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Schema payload is not valid JSON or has the wrong shape
    #[error("Malformed filter schema: {0}")]
    MalformedSchema(#[from] serde_json::Error),

    /// Schema declares a range that is inverted or not finite
    #[error("Filter {id} declares an invalid range [{min}, {max}]")]
    InvalidSchemaRange { id: String, min: f64, max: f64 },

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Value rejected for a filter (inverted bounds, NaN, wrong input kind)
    #[error("Invalid value for filter {id}: {reason}")]
    InvalidValue { id: String, reason: String },
}

impl FilterError {
    pub fn invalid_value(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

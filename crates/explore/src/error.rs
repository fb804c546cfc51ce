use rezoning_filters::FilterError;
use rezoning_geometry::GeometryError;
use thiserror::Error;

/// Result type for explore operations
pub type Result<T> = std::result::Result<T, ExploreError>;

/// Why a zone generation request failed. Kept in the `Failed` state; the caller
/// retries by generating again.
#[derive(Error, Debug)]
pub enum ZoneFetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode zones: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum ExploreError {
    /// Filter schema could not be fetched or parsed; the session cannot start
    #[error("Failed to load filter schema: {0}")]
    SchemaLoad(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    ZoneFetch(#[from] ZoneFetchError),

    #[error("Unknown area: {0}")]
    UnknownArea(String),

    /// Zones were requested before both an area and a resource were chosen
    #[error("Select an area and a resource first")]
    SelectionIncomplete,

    #[error("Grid size {0} km² is not offered")]
    UnsupportedGridSize(u32),

    #[error("Unknown {section} preset: {name}")]
    UnknownPreset { section: &'static str, name: String },

    /// NaN or infinite weight or LCOE value; never sent to the API
    #[error("{section} value {id} must be finite, got {value}")]
    NonFiniteInput {
        section: &'static str,
        id: String,
        value: f64,
    },

    #[error("{0}")]
    Other(String),
}

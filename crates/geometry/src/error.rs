use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Error, Debug)]
pub enum GeometryError {
    /// Area has no usable bounds, so no extent can be derived for it
    #[error("Area {0} has no bounds")]
    MissingBounds(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

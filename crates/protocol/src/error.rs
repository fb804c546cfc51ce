use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Malformed extent: {0}")]
    MalformedExtent(String),
}

use thiserror::Error;

/// Error types for the streamkmeans library
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// The eviction limit k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// The dispersion threshold is NaN or negative
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Two attribute vectors of different lengths were combined
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A record does not match its declared attribute kinds or the schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// A numerical attribute received a value that is not a number
    #[error("Value is not numeric: {0}")]
    NotNumeric(String),

    /// Not enough elements for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// No cluster holds a centroid yet
    #[error("No populated cluster available. Add an element or initialize first.")]
    NoClusters,

    /// No cluster carries the given id
    #[error("Unknown cluster id: {0}")]
    UnknownCluster(usize),
}

//! Error types for the hanger engine

use thiserror::Error;

use crate::segment::ElementId;

/// Main error type for support placement operations
#[derive(Error, Debug)]
pub enum HangerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("No supports producible: {0}")]
    NoSupportsProducible(String),

    #[error("Spatial query failed: {0}")]
    SpatialQuery(String),

    #[error("Segment '{0}' not found in host model")]
    SegmentNotFound(ElementId),

    #[error("Support is already linked to placed element '{0}'")]
    AlreadyLinked(ElementId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for hanger engine operations
pub type HangerResult<T> = Result<T, HangerError>;

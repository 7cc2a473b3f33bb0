//! Error types for the spatial binning engine.

use thiserror::Error;

/// Spatial binning errors.
///
/// All failures are synchronous failures of the call that triggered them.
/// The engine never retries and never returns a partially filled bin set.
#[derive(Error, Debug)]
pub enum SpatialError {
    /// Invalid parameter (non-positive cell size, degenerate extent,
    /// malformed CRS pairing).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Aggregation invoked with geometries whose CRS disagrees with the grid.
    #[error("CRS mismatch: geometries are in EPSG:{geometries} but the grid is in EPSG:{grid}")]
    CrsMismatch { geometries: i32, grid: i32 },

    /// Mixed point/area batches are unsupported; no partial aggregation is
    /// attempted.
    #[error("Unsupported geometry mix: {0}")]
    UnsupportedGeometryMix(String),

    /// Projection batch exceeds the configured chunk-size ceiling. The caller
    /// must chunk the request itself.
    #[error("Projection batch too large: {actual} geometries exceeds the limit of {limit}")]
    BatchTooLarge { limit: usize, actual: usize },

    /// Relation path invoked with more geometries than the configured maximum.
    #[error("Too many geometries for the relation path: {actual} exceeds the limit of {limit}")]
    TooManyGeometries { limit: usize, actual: usize },

    /// The external geometry service returned a response missing required
    /// fields. Fatal for the call; never retried.
    #[error("Collaborator contract violation: {0}")]
    ContractViolation(String),

    /// Transport-level failure reaching the external geometry service.
    #[error("Remote error: {0}")]
    Remote(String),
}

/// Result type for spatial operations.
pub type Result<T> = std::result::Result<T, SpatialError>;

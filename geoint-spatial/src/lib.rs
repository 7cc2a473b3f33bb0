//! Spatial grid construction and feature binning.
//!
//! This crate computes spatial histograms: it partitions the world into a
//! regular rectangular grid in Web Mercator and counts how many input
//! features fall into (or intersect) each grid cell. The output is a sparse
//! set of populated cells ("bins"), each carrying a hit count and its cell
//! geometry, ready for heat-map style rendering.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        BinningEngine                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  build_grid(cell_size)          aggregate(grid, geometries)  │
//! └──────────────┬───────────────────────────┬───────────────────┘
//!                ▼                           ▼
//!        projection front-end          batch dispatch
//!        (identity no-op,           ┌───────┴────────┐
//!         point fast path)          ▼                ▼
//!                │            point index      relation test
//!                ▼            lookup (O(1))    (all cells ×
//!     GeoOperationsProvider                    all geometries)
//!      (embedded | remote)                           │
//!                                                    ▼
//!                                                 BinSet
//! ```
//!
//! Grid construction is comparatively expensive; a built
//! [`RectangularGrid`] is immutable and safe to share read-only across
//! concurrent aggregation calls. Each call produces its own [`BinSet`].
//!
//! # Modules
//!
//! - [`crs`]: coordinate reference system identifiers
//! - [`cell`]: rectangular grid cells
//! - [`grid`]: grid construction parameters and cell index arithmetic
//! - [`mercator`]: closed-form spherical Web Mercator transform
//! - [`provider`]: geometry-operations provider (embedded and remote)
//! - [`engine`]: grid building and aggregation
//! - [`bins`]: sparse aggregation results and feature export
//! - [`config`]: deployment configuration and size limits
//! - [`error`]: error types

pub mod bins;
pub mod cell;
pub mod config;
pub mod crs;
pub mod engine;
pub mod error;
pub mod grid;
pub mod mercator;
pub mod provider;

pub use bins::{Bin, BinAttributes, BinFeature, BinFeatureCollection, BinSet};
pub use cell::GridCell;
pub use config::{DeploymentMode, EngineLimits, GeoServiceConfig};
pub use crs::Crs;
pub use engine::{points_from_coordinates, BinningEngine};
pub use error::{Result, SpatialError};
pub use grid::{GridParams, RectangularGrid};
pub use provider::{EmbeddedGeoProvider, GeoOperationsProvider, RemoteGeoProvider};

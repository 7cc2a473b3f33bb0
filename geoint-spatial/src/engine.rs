//! Aggregation engine: grid building and feature binning.
//!
//! The engine is the top-level entry point. `build_grid` grids the whole
//! geographic world extent, reprojected into Web Mercator, at a caller-
//! supplied cell size in meters. `aggregate` counts a geometry batch into a
//! built grid, dispatching on the batch's geometry kind:
//!
//! - all points: direct O(1) index lookup per point, no size bound beyond
//!   memory;
//! - all area/line geometries: one relation-test call against every cell
//!   ring, bounded by a hard cap since the test is pairwise.
//!
//! Aggregation is all-or-nothing; no partial bin set is ever returned.

use crate::bins::BinSet;
use crate::cell::GridCell;
use crate::config::EngineLimits;
use crate::crs::Crs;
use crate::error::{Result, SpatialError};
use crate::grid::{GridParams, RectangularGrid};
use crate::mercator;
use crate::provider::GeoOperationsProvider;
use geo::BoundingRect;
use geo_types::{Geometry, Point};

/// Canonical whole-world geographic extent.
const WORLD_WGS84: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

/// Build a point batch from parallel latitude and longitude arrays.
///
/// Points carry x = longitude, y = latitude. The arrays must have equal
/// length.
pub fn points_from_coordinates(
    latitudes: &[f64],
    longitudes: &[f64],
) -> Result<Vec<Geometry<f64>>> {
    if latitudes.len() != longitudes.len() {
        return Err(SpatialError::InvalidParameter(format!(
            "coordinate arrays must have equal length, got {} latitudes and {} longitudes",
            latitudes.len(),
            longitudes.len()
        )));
    }

    Ok(latitudes
        .iter()
        .zip(longitudes)
        .map(|(&lat, &lon)| Geometry::Point(Point::new(lon, lat)))
        .collect())
}

/// Spatial binning engine.
///
/// Generic over the geometry-operations provider so embedded and remote
/// deployments share one engine.
pub struct BinningEngine<P> {
    provider: P,
    limits: EngineLimits,
}

impl<P: GeoOperationsProvider> BinningEngine<P> {
    /// Create an engine with default limits.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            limits: EngineLimits::default(),
        }
    }

    /// Create an engine with explicit limits.
    pub fn with_limits(provider: P, limits: EngineLimits) -> Self {
        Self { provider, limits }
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Reproject a geometry batch, same cardinality and order as the input.
    ///
    /// Identity reprojection is a no-op and never reaches the provider. A
    /// batch of nothing but points from geographic WGS84 into Web Mercator
    /// takes the in-process closed-form transform; everything else is
    /// delegated, bounded by the configured batch ceiling.
    pub async fn project(
        &self,
        geometries: &[Geometry<f64>],
        source: Crs,
        target: Crs,
    ) -> Result<Vec<Geometry<f64>>> {
        if source == target {
            return Ok(geometries.to_vec());
        }

        let all_points = geometries
            .iter()
            .all(|g| matches!(g, Geometry::Point(_)));
        if all_points && source == Crs::WGS84 && target == Crs::WEB_MERCATOR {
            tracing::trace!(count = geometries.len(), "projecting points via fast path");
            return Ok(geometries
                .iter()
                .map(mercator::project_geometry_forward)
                .collect());
        }

        if geometries.len() > self.limits.max_projection_batch {
            return Err(SpatialError::BatchTooLarge {
                limit: self.limits.max_projection_batch,
                actual: geometries.len(),
            });
        }

        self.provider.project(geometries, source, target).await
    }

    /// Build a grid over the whole world in Web Mercator with square cells
    /// of `cell_size_meters`.
    pub async fn build_grid(&self, cell_size_meters: f64) -> Result<RectangularGrid> {
        if !cell_size_meters.is_finite() || cell_size_meters <= 0.0 {
            return Err(SpatialError::InvalidParameter(format!(
                "cell size must be positive, got {} m",
                cell_size_meters
            )));
        }

        let (xmin, ymin, xmax, ymax) = WORLD_WGS84;
        let world = GridCell::new(xmin, ymin, xmax, ymax, Crs::WGS84)?;
        let projected = self
            .project(
                &[Geometry::Polygon(world.to_polygon())],
                Crs::WGS84,
                Crs::WEB_MERCATOR,
            )
            .await?;

        let envelope = projected
            .first()
            .and_then(|g| g.bounding_rect())
            .ok_or_else(|| {
                SpatialError::ContractViolation(
                    "projected world extent has no bounding rectangle".into(),
                )
            })?;

        let extent = GridCell::new(
            envelope.min().x,
            envelope.min().y,
            envelope.max().x,
            envelope.max().y,
            Crs::WEB_MERCATOR,
        )?;
        let params = GridParams::new(extent, cell_size_meters)?;
        RectangularGrid::build(params, Crs::WEB_MERCATOR)
    }

    /// Aggregate a geometry batch into a built grid.
    ///
    /// The batch must be homogeneous: all points, or all area/line
    /// geometries. The batch CRS must match the grid's; callers reproject
    /// first. Bins come back in first-hit order.
    pub async fn aggregate(
        &self,
        grid: &RectangularGrid,
        geometries: &[Geometry<f64>],
        crs: Crs,
    ) -> Result<BinSet> {
        if geometries.is_empty() {
            return Ok(BinSet::new(grid.crs()));
        }

        if crs != grid.crs() {
            return Err(SpatialError::CrsMismatch {
                geometries: crs.wkid(),
                grid: grid.crs().wkid(),
            });
        }

        let point_count = geometries
            .iter()
            .filter(|g| matches!(g, Geometry::Point(_)))
            .count();

        if point_count == geometries.len() {
            self.aggregate_points(grid, geometries)
        } else if point_count == 0 {
            self.aggregate_relations(grid, geometries, crs).await
        } else {
            Err(SpatialError::UnsupportedGeometryMix(format!(
                "{} points mixed with {} other geometries",
                point_count,
                geometries.len() - point_count
            )))
        }
    }

    /// Point fast path: one index lookup per point. Points outside the grid
    /// extent are silently excluded.
    fn aggregate_points(
        &self,
        grid: &RectangularGrid,
        points: &[Geometry<f64>],
    ) -> Result<BinSet> {
        let mut bins = BinSet::new(grid.crs());
        let mut outside = 0usize;

        for geometry in points {
            let Geometry::Point(point) = geometry else {
                unreachable!("dispatch guarantees an all-point batch");
            };
            match grid.find_index(point.x(), point.y()) {
                Some(index) => {
                    let cell = grid.cell(index).ok_or_else(|| {
                        SpatialError::InvalidParameter(format!(
                            "cell index {} out of range for grid of {} cells",
                            index,
                            grid.len()
                        ))
                    })?;
                    bins.record_hit(index, cell);
                }
                None => outside += 1,
            }
        }

        tracing::debug!(
            points = points.len(),
            outside = outside,
            bins = bins.len(),
            "aggregated point batch"
        );

        Ok(bins)
    }

    /// Relation path: one relate call pairing every cell ring with every
    /// input geometry. Each returned pair counts one hit; no deduplication
    /// beyond what the relation capability itself returns.
    async fn aggregate_relations(
        &self,
        grid: &RectangularGrid,
        geometries: &[Geometry<f64>],
        crs: Crs,
    ) -> Result<BinSet> {
        if geometries.len() > self.limits.max_relate_geometries {
            return Err(SpatialError::TooManyGeometries {
                limit: self.limits.max_relate_geometries,
                actual: geometries.len(),
            });
        }

        let rings = grid.rings();
        let pairs = self
            .provider
            .relate_intersects(&rings, geometries, crs)
            .await?;

        let mut bins = BinSet::new(grid.crs());
        for (cell_index, _geometry_index) in pairs {
            let cell = grid.cell(cell_index).ok_or_else(|| {
                SpatialError::ContractViolation(format!(
                    "relation pair references cell index {} but the grid has {} cells",
                    cell_index,
                    grid.len()
                ))
            })?;
            bins.record_hit(cell_index, cell);
        }

        tracing::debug!(
            geometries = geometries.len(),
            bins = bins.len(),
            hits = bins.total_hits(),
            "aggregated geometry batch via relation path"
        );

        Ok(bins)
    }
}

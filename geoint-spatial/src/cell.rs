//! Rectangular grid cells.

use crate::crs::Crs;
use crate::error::{Result, SpatialError};
use geo_types::{coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// One rectangular region of a spatial grid.
///
/// Bounds are in the linear units of the cell's CRS (meters under Web
/// Mercator, degrees when the CRS is geographic). Immutable once
/// constructed; `xmin < xmax` and `ymin < ymax` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    crs: Crs,
}

impl GridCell {
    /// Create a new cell, rejecting degenerate bounds.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64, crs: Crs) -> Result<Self> {
        if !xmin.is_finite() || !ymin.is_finite() || !xmax.is_finite() || !ymax.is_finite() {
            return Err(SpatialError::InvalidParameter(
                "cell bounds must be finite".to_string(),
            ));
        }
        if xmin >= xmax || ymin >= ymax {
            return Err(SpatialError::InvalidParameter(format!(
                "degenerate cell bounds: [{}, {}, {}, {}]",
                xmin, ymin, xmax, ymax
            )));
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
            crs,
        })
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Center point `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (
            self.xmin + self.width() / 2.0,
            self.ymin + self.height() / 2.0,
        )
    }

    /// Closed-interval containment test on all four bounds.
    ///
    /// A point exactly on a shared edge is contained by every adjacent cell;
    /// index resolution on the owning grid breaks that tie (the upper cell
    /// wins).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.xmin <= x && x <= self.xmax && self.ymin <= y && y <= self.ymax
    }

    /// The cell boundary as a closed 5-point ring.
    ///
    /// Point order is `(xmin,ymin) → (xmin,ymax) → (xmax,ymax) → (xmax,ymin)
    /// → (xmin,ymin)`. The relation aggregation path pairs rings with cell
    /// indices positionally, so this order is fixed.
    pub fn ring(&self) -> [(f64, f64); 5] {
        [
            (self.xmin, self.ymin),
            (self.xmin, self.ymax),
            (self.xmax, self.ymax),
            (self.xmax, self.ymin),
            (self.xmin, self.ymin),
        ]
    }

    /// The cell boundary as a `geo` polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior = LineString::from(
            self.ring()
                .iter()
                .map(|&(x, y)| coord! { x: x, y: y })
                .collect::<Vec<_>>(),
        );
        Polygon::new(exterior, vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_bounds() {
        assert!(GridCell::new(0.0, 0.0, 0.0, 10.0, Crs::WEB_MERCATOR).is_err());
        assert!(GridCell::new(0.0, 10.0, 10.0, 10.0, Crs::WEB_MERCATOR).is_err());
        assert!(GridCell::new(10.0, 0.0, 0.0, 10.0, Crs::WEB_MERCATOR).is_err());
        assert!(GridCell::new(0.0, 0.0, f64::NAN, 10.0, Crs::WEB_MERCATOR).is_err());
    }

    #[test]
    fn test_accessors() {
        let cell = GridCell::new(0.0, -5.0, 10.0, 5.0, Crs::WEB_MERCATOR).unwrap();
        assert_eq!(cell.width(), 10.0);
        assert_eq!(cell.height(), 10.0);
        assert_eq!(cell.center(), (5.0, 0.0));
        assert_eq!(cell.crs(), Crs::WEB_MERCATOR);
    }

    #[test]
    fn test_contains_is_closed_on_all_bounds() {
        let cell = GridCell::new(0.0, 0.0, 10.0, 10.0, Crs::WEB_MERCATOR).unwrap();
        assert!(cell.contains(0.0, 0.0));
        assert!(cell.contains(10.0, 10.0));
        assert!(cell.contains(5.0, 10.0));
        assert!(!cell.contains(10.000001, 5.0));
        assert!(!cell.contains(-0.000001, 5.0));
    }

    #[test]
    fn test_ring_order_is_fixed_and_closed() {
        let cell = GridCell::new(1.0, 2.0, 3.0, 4.0, Crs::WEB_MERCATOR).unwrap();
        let ring = cell.ring();
        assert_eq!(ring[0], (1.0, 2.0));
        assert_eq!(ring[1], (1.0, 4.0));
        assert_eq!(ring[2], (3.0, 4.0));
        assert_eq!(ring[3], (3.0, 2.0));
        assert_eq!(ring[4], ring[0]);
    }
}

//! Rectangular grid construction and cell index arithmetic.
//!
//! [`GridParams`] owns the index formula: cell construction and coordinate
//! lookup both derive from the same `(origin, cell_size, rows, columns)`
//! value, so the two cannot fall out of sync at cell boundaries.
//!
//! # Index order
//!
//! Cells are laid out column-major: for column `c` and row `r` the linear
//! index is `r + rows * c`. Lookup uses floor division against the cell
//! size, so a coordinate exactly on a shared interior edge resolves to the
//! upper (higher-index) cell. Coordinates exactly on the extent's max x/y
//! clamp into the last column/row.

use crate::cell::GridCell;
use crate::crs::Crs;
use crate::error::{Result, SpatialError};
use geo_types::Polygon;

/// Grid construction parameters.
///
/// Derives row/column counts from an extent and a cell size, and resolves
/// both cell bounds and coordinate lookups through the same arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    extent: GridCell,
    cell_size: f64,
    rows: usize,
    columns: usize,
}

impl GridParams {
    /// Create parameters for gridding `extent` with square cells of
    /// `cell_size` linear units.
    ///
    /// Counts are `ceil(extent dimension / cell_size)`; the outer edge of the
    /// last row/column is later snapped to the extent's true max bound to
    /// avoid truncation gaps from the ceiling division.
    pub fn new(extent: GridCell, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SpatialError::InvalidParameter(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }

        let rows = (extent.height() / cell_size).ceil() as usize;
        let columns = (extent.width() / cell_size).ceil() as usize;

        Ok(Self {
            extent,
            cell_size,
            rows,
            columns,
        })
    }

    pub fn extent(&self) -> &GridCell {
        &self.extent
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Bounds of the cell at `(row, column)`, with the last row/column
    /// snapped to the extent's true max bound.
    pub fn cell_bounds(&self, row: usize, column: usize) -> (f64, f64, f64, f64) {
        let xmin = self.extent.xmin() + column as f64 * self.cell_size;
        let ymin = self.extent.ymin() + row as f64 * self.cell_size;

        let xmax = if column + 1 == self.columns {
            self.extent.xmax()
        } else {
            self.extent.xmin() + (column + 1) as f64 * self.cell_size
        };
        let ymax = if row + 1 == self.rows {
            self.extent.ymax()
        } else {
            self.extent.ymin() + (row + 1) as f64 * self.cell_size
        };

        (xmin, ymin, xmax, ymax)
    }

    /// Linear column-major index for `(row, column)`.
    pub fn linear_index(&self, row: usize, column: usize) -> usize {
        row + self.rows * column
    }

    /// Resolve a coordinate to its cell index, or `None` when the coordinate
    /// lies outside the extent's closed bounds.
    ///
    /// Interior cell boundaries are half-open `[min, max)` under the floor
    /// division, except that the extent's max x/y clamp into the last
    /// column/row.
    pub fn find_index(&self, x: f64, y: f64) -> Option<usize> {
        if !self.extent.contains(x, y) {
            return None;
        }

        let column = (((x - self.extent.xmin()) / self.cell_size).floor() as usize)
            .min(self.columns - 1);
        let row =
            (((y - self.extent.ymin()) / self.cell_size).floor() as usize).min(self.rows - 1);

        Some(self.linear_index(row, column))
    }
}

/// An immutable rectangular spatial grid.
///
/// Owns `rows * columns` cells built from one [`GridParams`] instance.
/// Construction is comparatively expensive; a built grid is reused across
/// aggregation calls and is safe to share read-only.
#[derive(Debug, Clone)]
pub struct RectangularGrid {
    params: GridParams,
    cells: Vec<GridCell>,
    crs: Crs,
}

impl RectangularGrid {
    /// Build all cells in column-major order (columns outer, rows inner).
    pub fn build(params: GridParams, crs: Crs) -> Result<Self> {
        let mut cells = Vec::with_capacity(params.cell_count());
        for column in 0..params.columns() {
            for row in 0..params.rows() {
                let (xmin, ymin, xmax, ymax) = params.cell_bounds(row, column);
                cells.push(GridCell::new(xmin, ymin, xmax, ymax, crs)?);
            }
        }

        tracing::debug!(
            rows = params.rows(),
            columns = params.columns(),
            cell_size = params.cell_size(),
            "built rectangular grid"
        );

        Ok(Self {
            params,
            cells,
            crs,
        })
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resolve a coordinate to its cell index. O(1); no search over cells.
    pub fn find_index(&self, x: f64, y: f64) -> Option<usize> {
        self.params.find_index(x, y)
    }

    /// Every cell boundary as a closed polygon ring, index-aligned with the
    /// cell sequence.
    pub fn rings(&self) -> Vec<Polygon<f64>> {
        self.cells.iter().map(|cell| cell.to_polygon()).collect()
    }
}

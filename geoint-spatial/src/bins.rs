//! Sparse aggregation results.
//!
//! A [`BinSet`] is the outcome of one aggregation call: the populated grid
//! cells ("bins"), each with a hit count and its cell geometry. Bins are
//! exposed in first-hit order, not spatial order. The set holds no
//! back-reference to the grid; the caller owns it exclusively.

use crate::cell::GridCell;
use crate::crs::Crs;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One populated grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    /// Column-major cell index in the originating grid.
    pub cell_index: usize,

    /// The cell geometry.
    pub cell: GridCell,

    /// Number of hits recorded for this cell. Always >= 1.
    pub hit_count: u64,
}

/// Sparse mapping from cell index to hit count and cell geometry.
///
/// Built once by an aggregation call and read-only afterward.
#[derive(Debug, Clone)]
pub struct BinSet {
    crs: Crs,
    bins: Vec<Bin>,
    positions: FxHashMap<usize, usize>,
}

impl BinSet {
    /// Create an empty bin set carrying the grid's CRS.
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            bins: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// The CRS of the originating grid.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Record one hit against a cell, inserting a fresh bin on first hit.
    pub(crate) fn record_hit(&mut self, cell_index: usize, cell: &GridCell) {
        match self.positions.get(&cell_index) {
            Some(&position) => {
                self.bins[position].hit_count += 1;
            }
            None => {
                self.positions.insert(cell_index, self.bins.len());
                self.bins.push(Bin {
                    cell_index,
                    cell: *cell,
                    hit_count: 1,
                });
            }
        }
    }

    /// Bins in first-hit order.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Look up a bin by cell index.
    pub fn get(&self, cell_index: usize) -> Option<&Bin> {
        self.positions.get(&cell_index).map(|&p| &self.bins[p])
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Sum of hit counts across all bins.
    pub fn total_hits(&self) -> u64 {
        self.bins.iter().map(|b| b.hit_count).sum()
    }

    /// Export as a generic feature collection: one feature per bin,
    /// geometry = the cell's closed polygon ring, attributes = the hit count.
    pub fn to_feature_collection(&self) -> BinFeatureCollection {
        BinFeatureCollection {
            wkid: self.crs.wkid(),
            features: self
                .bins
                .iter()
                .map(|bin| BinFeature {
                    geometry: bin.cell.to_polygon(),
                    attributes: BinAttributes {
                        hit_count: bin.hit_count,
                    },
                })
                .collect(),
        }
    }
}

/// Attributes carried by an exported bin feature.
#[derive(Debug, Clone, Serialize)]
pub struct BinAttributes {
    #[serde(rename = "hitCount")]
    pub hit_count: u64,
}

/// One exported bin feature.
#[derive(Debug, Clone, Serialize)]
pub struct BinFeature {
    pub geometry: geo_types::Polygon<f64>,
    pub attributes: BinAttributes,
}

/// Logical feature-collection shape for downstream serialization.
#[derive(Debug, Clone, Serialize)]
pub struct BinFeatureCollection {
    pub wkid: i32,
    pub features: Vec<BinFeature>,
}

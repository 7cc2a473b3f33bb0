//! Coordinate reference system identifiers.
//!
//! A CRS is identified by its well-known integer id (WKID). Every grid and
//! every geometry batch carries exactly one CRS; operations that mix CRSs
//! without an explicit reprojection are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known integer id of a coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub i32);

impl Crs {
    /// Geographic WGS84 (degrees).
    pub const WGS84: Crs = Crs(4326);

    /// Spherical Web Mercator (meters).
    pub const WEB_MERCATOR: Crs = Crs(3857);

    /// The well-known id.
    pub fn wkid(&self) -> i32 {
        self.0
    }

    /// Geographic systems carry degree coordinates rather than linear units.
    pub fn is_geographic(&self) -> bool {
        self.0 == 4326
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Crs::WGS84.wkid(), 4326);
        assert_eq!(Crs::WEB_MERCATOR.wkid(), 3857);
        assert!(Crs::WGS84.is_geographic());
        assert!(!Crs::WEB_MERCATOR.is_geographic());
    }

    #[test]
    fn test_display() {
        assert_eq!(Crs::WEB_MERCATOR.to_string(), "EPSG:3857");
    }
}

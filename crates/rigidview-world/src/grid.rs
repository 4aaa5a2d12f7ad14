//! Broadphase grid occupancy.

use serde::{Deserialize, Serialize};

/// One grid cell and the number of bodies registered in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Column index (may be negative).
    pub column: i64,
    /// Row index (may be negative).
    pub row: i64,
    /// Bodies currently in the cell.
    pub occupants: usize,
}

/// Uniform broadphase grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadphaseGrid {
    /// Cell width in world units.
    pub bucket_width: f64,
    /// Cell height in world units.
    pub bucket_height: f64,
    /// Non-empty cells.
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

impl Default for BroadphaseGrid {
    fn default() -> Self {
        Self {
            bucket_width: 48.0,
            bucket_height: 48.0,
            buckets: Vec::new(),
        }
    }
}

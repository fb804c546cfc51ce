use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned geographic box in `[west, south, east, north]` order.
///
/// Serialized as a four element array so it matches the bounds published in the
/// area list and the `bounds` field of zone requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// All four edges are finite and the box is not inverted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
            && self.west <= self.east
            && self.south <= self.north
    }

    /// Smallest extent containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.west <= other.west
            && self.south <= other.south
            && self.east >= other.east
            && self.north >= other.north
    }
}

impl From<[f64; 4]> for Extent {
    fn from([west, south, east, north]: [f64; 4]) -> Self {
        Self::new(west, south, east, north)
    }
}

impl From<Extent> for [f64; 4] {
    fn from(extent: Extent) -> Self {
        extent.to_array()
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Parses the comma separated `"west,south,east,north"` form used by the area list.
impl FromStr for Extent {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self> {
        let values = raw
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| ProtocolError::MalformedExtent(format!("{raw:?}: {err}")))?;
        let [west, south, east, north] = values[..] else {
            return Err(ProtocolError::MalformedExtent(format!(
                "{raw:?}: expected 4 values, got {}",
                values.len()
            )));
        };
        let extent = Self::new(west, south, east, north);
        if !extent.is_valid() {
            return Err(ProtocolError::MalformedExtent(format!(
                "{raw:?}: not a valid box"
            )));
        }
        Ok(extent)
    }
}

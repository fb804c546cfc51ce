//! Zone generation request and response types.

use crate::{Extent, Resource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grid cell sizes offered to the user, in km². The first entry is the default.
pub const GRID_OPTIONS: [u32; 3] = [1, 9, 25];

/// Regular grid used instead of discrete zones for large (offshore) extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    pub size_km2: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            size_km2: GRID_OPTIONS[0],
        }
    }
}

/// Per-criterion zone scoring weights, keyed by weight id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights(pub BTreeMap<String, f64>);

impl Weights {
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, value: f64) -> Self {
        self.0.insert(id.into(), value);
        self
    }

    pub fn set(&mut self, id: impl Into<String>, value: f64) {
        self.0.insert(id.into(), value);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }
}

/// Economic assumptions for the levelized cost of energy calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LcoeParams(pub BTreeMap<String, f64>);

impl LcoeParams {
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, value: f64) -> Self {
        self.0.insert(id.into(), value);
        self
    }

    pub fn set(&mut self, id: impl Into<String>, value: f64) {
        self.0.insert(id.into(), value);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }
}

/// Everything that determines a zone generation result.
///
/// Recorded at dispatch time and compared on completion: a response whose params
/// differ from the recorded ones is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRequestParams {
    pub area_id: String,
    pub resource: Resource,
    pub extent: Extent,
    pub grid: Option<GridSpec>,
    /// Compiled filter fragment, possibly empty.
    pub filters: String,
    pub weights: Weights,
    pub lcoe: LcoeParams,
}

impl ZoneRequestParams {
    /// Whether this request belongs to the given area/resource selection.
    #[must_use]
    pub fn matches_selection(&self, area_id: &str, resource: Resource) -> bool {
        self.area_id == area_id && self.resource == resource
    }

    #[must_use]
    pub fn body(&self) -> ZoneRequestBody {
        ZoneRequestBody {
            weights: self.weights.clone(),
            lcoe: self.lcoe.clone(),
            bounds: self.grid.map(|_| self.extent),
        }
    }
}

/// JSON body posted to the zones endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRequestBody {
    pub weights: Weights,
    pub lcoe: LcoeParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Extent>,
}

/// Per-zone summary scores computed by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcoe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_output: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_score: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneProperties {
    #[serde(default)]
    pub summary: ZoneSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One generated zone: a GeoJSON-like feature with summary properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub geometry: serde_json::Value,
    #[serde(default)]
    pub properties: ZoneProperties,
}

/// Zone generation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZonePayload(pub Vec<Zone>);

impl ZonePayload {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.0.iter()
    }

    /// Zone with the lowest LCOE, ignoring zones the API could not score.
    #[must_use]
    pub fn cheapest(&self) -> Option<&Zone> {
        self.0
            .iter()
            .filter_map(|zone| zone.properties.summary.lcoe.map(|lcoe| (zone, lcoe)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(zone, _)| zone)
    }
}

//! TopoJSON decoding for the EEZ boundary file.
//!
//! Only polygonal geometries are decoded; other geometry types are ignored.

use crate::error::{GeometryError, Result};
use geo::{Coord, LineString, Polygon};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Object holding the EEZ polygons in the published topology.
pub const EEZ_OBJECT: &str = "eez_v11";
/// Property naming the territory a maritime zone belongs to.
pub const TERRITORY_KEY: &str = "ISO_TER1";

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

type Properties = Option<serde_json::Map<String, serde_json::Value>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Properties,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Properties,
    },
    #[serde(other)]
    Unsupported,
}

/// EEZ polygons grouped by territory id, in topology order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EezIndex {
    by_territory: BTreeMap<String, Vec<Polygon<f64>>>,
}

impl EezIndex {
    /// Decode `object` from a TopoJSON document.
    pub fn from_topojson(raw: &[u8], object: &str) -> Result<Self> {
        let topology: Topology = serde_json::from_slice(raw)?;
        let arcs = decode_arcs(&topology)?;
        let root = topology
            .objects
            .get(object)
            .ok_or_else(|| GeometryError::Topology(format!("object {object} not found")))?;

        let mut index = Self::default();
        index.collect(root, &arcs)?;
        log::info!(
            "Decoded EEZ topology: {} territories, {} polygons",
            index.by_territory.len(),
            index.polygon_count()
        );
        Ok(index)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading EEZ topology from {}", path.display());
        let raw = tokio::fs::read(path).await?;
        Self::from_topojson(&raw, EEZ_OBJECT)
    }

    #[must_use]
    pub fn polygons(&self, territory: &str) -> &[Polygon<f64>] {
        self.by_territory
            .get(territory)
            .map_or(&[], Vec::as_slice)
    }

    pub fn territories(&self) -> impl Iterator<Item = &str> {
        self.by_territory.keys().map(String::as_str)
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.by_territory.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_territory.is_empty()
    }

    pub fn insert(&mut self, territory: impl Into<String>, polygon: Polygon<f64>) {
        self.by_territory
            .entry(territory.into())
            .or_default()
            .push(polygon);
    }

    fn collect(&mut self, geometry: &TopoGeometry, arcs: &[Vec<Coord<f64>>]) -> Result<()> {
        match geometry {
            TopoGeometry::GeometryCollection { geometries } => {
                for child in geometries {
                    self.collect(child, arcs)?;
                }
            }
            TopoGeometry::Polygon { arcs: rings, properties } => {
                if let Some(territory) = territory_of(properties) {
                    self.insert(territory, polygon(rings, arcs)?);
                }
            }
            TopoGeometry::MultiPolygon {
                arcs: polygons,
                properties,
            } => {
                if let Some(territory) = territory_of(properties) {
                    for rings in polygons {
                        self.insert(territory.clone(), polygon(rings, arcs)?);
                    }
                }
            }
            TopoGeometry::Unsupported => {}
        }
        Ok(())
    }
}

fn territory_of(properties: &Properties) -> Option<String> {
    match properties.as_ref()?.get(TERRITORY_KEY)? {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}

/// Absolute coordinates for every arc, undoing quantization when a transform is set.
fn decode_arcs(topology: &Topology) -> Result<Vec<Vec<Coord<f64>>>> {
    topology
        .arcs
        .iter()
        .enumerate()
        .map(|(arc_index, arc)| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .map(|position| match *position.as_slice() {
                    [dx, dy, ..] => Ok(apply(topology.transform, &mut x, &mut y, dx, dy)),
                    _ => Err(GeometryError::Topology(format!(
                        "arc {arc_index} has a position with {} values",
                        position.len()
                    ))),
                })
                .collect()
        })
        .collect()
}

fn apply(transform: Option<Transform>, x: &mut f64, y: &mut f64, dx: f64, dy: f64) -> Coord<f64> {
    match transform {
        Some(t) => {
            *x += dx;
            *y += dy;
            Coord {
                x: *x * t.scale[0] + t.translate[0],
                y: *y * t.scale[1] + t.translate[1],
            }
        }
        None => Coord { x: dx, y: dy },
    }
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|indices| ring(indices, arcs));
    let exterior = rings
        .next()
        .transpose()?
        .unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Stitch arcs into a ring. A negative index `~i` walks arc `i` backwards, and the
/// first point of every following arc repeats the previous arc's last point.
fn ring(indices: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &index in indices {
        let (position, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(position)
            .ok()
            .and_then(|position| arcs.get(position))
            .ok_or_else(|| GeometryError::Topology(format!("arc index {index} out of range")))?;
        let skip = usize::from(!coords.is_empty());
        if reversed {
            coords.extend(arc.iter().rev().skip(skip).copied());
        } else {
            coords.extend(arc.iter().skip(skip).copied());
        }
    }
    Ok(LineString::new(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::BoundingRect;

    // Two unit squares side by side sharing the arc x=1, quantized with scale 1.
    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [1, 1], "translate": [10, 0]},
        "arcs": [
            [[1, 0], [0, 1]],
            [[1, 1], [-1, 0], [0, -1], [1, 0]],
            [[1, 0], [1, 0], [0, 1], [-1, 0]]
        ],
        "objects": {
            "eez_v11": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"ISO_TER1": "AAA"}},
                    {"type": "MultiPolygon", "arcs": [[[2, -1]]], "properties": {"ISO_TER1": "BBB"}},
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"ISO_TER1": null}},
                    {"type": "Point", "coordinates": [0, 0], "properties": {"ISO_TER1": "CCC"}}
                ]
            }
        }
    }"#;

    #[test]
    fn decodes_quantized_arcs_per_territory() {
        let index = EezIndex::from_topojson(TOPOLOGY.as_bytes(), EEZ_OBJECT).unwrap();
        assert_eq!(index.territories().collect::<Vec<_>>(), vec!["AAA", "BBB"]);

        let a = index.polygons("AAA")[0].bounding_rect().unwrap();
        assert_eq!((a.min().x, a.min().y, a.max().x, a.max().y), (10.0, 0.0, 11.0, 1.0));

        let b = index.polygons("BBB")[0].bounding_rect().unwrap();
        assert_eq!((b.min().x, b.min().y, b.max().x, b.max().y), (11.0, 0.0, 12.0, 1.0));
        assert!(index.polygons("CCC").is_empty());
    }

    #[test]
    fn stitched_rings_close() {
        let index = EezIndex::from_topojson(TOPOLOGY.as_bytes(), EEZ_OBJECT).unwrap();
        let ring = index.polygons("AAA")[0].exterior();
        assert!(ring.is_closed());
        assert_eq!(ring.0.len(), 5);
    }

    #[test]
    fn missing_object_and_bad_arcs_are_errors() {
        assert!(matches!(
            EezIndex::from_topojson(TOPOLOGY.as_bytes(), "countries"),
            Err(GeometryError::Topology(_))
        ));
        let bad = r#"{"type": "Topology", "arcs": [[[0, 0]]], "objects": {"eez_v11":
            {"type": "Polygon", "arcs": [[4]], "properties": {"ISO_TER1": "AAA"}}}}"#;
        assert!(matches!(
            EezIndex::from_topojson(bad.as_bytes(), EEZ_OBJECT),
            Err(GeometryError::Topology(_))
        ));
    }
}
